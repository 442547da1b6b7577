use serde::{Deserialize, Serialize};
use tidydrive_types::TidyDriveError;

/// 解析済みテンプレートの1単位
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TemplateSegment {
    Literal(String),
    Variable {
        name: String,
        format: Option<String>,
        function: Option<String>,
        args: Vec<String>,
    },
}

/// テンプレート文字列をセグメント列に解析する。
/// `{...}` はネストした括弧で深さが増え、閉じられない `{` は解析エラー。
/// 同じ入力は常に同じセグメント列になる。
pub fn parse(template: &str) -> Result<Vec<TemplateSegment>, TidyDriveError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars();

    while let Some(ch) = chars.next() {
        if ch != '{' {
            literal.push(ch);
            continue;
        }

        if !literal.is_empty() {
            segments.push(TemplateSegment::Literal(std::mem::take(&mut literal)));
        }

        // 対応する '}' まで読み取る
        let mut depth = 1usize;
        let mut content = String::new();
        for inner in chars.by_ref() {
            match inner {
                '{' => {
                    depth += 1;
                    content.push(inner);
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    content.push(inner);
                }
                _ => content.push(inner),
            }
        }

        if depth != 0 {
            return Err(TidyDriveError::Template {
                message: format!("Unclosed '{{' in template: {}", template),
            });
        }

        segments.push(parse_variable(&content));
    }

    if !literal.is_empty() {
        segments.push(TemplateSegment::Literal(literal));
    }

    Ok(segments)
}

/// `{...}` の中身を分解する。
/// `name`, `name:format`, `name|func`, `name|func(a,b)` の4形を受け付ける。
fn parse_variable(content: &str) -> TemplateSegment {
    let (var_part, func_part) = match content.find('|') {
        Some(idx) => (&content[..idx], Some(&content[idx + 1..])),
        None => (content, None),
    };

    let (name, format) = match var_part.find(':') {
        Some(idx) => (
            var_part[..idx].to_string(),
            Some(var_part[idx + 1..].to_string()),
        ),
        None => (var_part.to_string(), None),
    };

    let (function, args) = match func_part {
        Some(call) => {
            let (func_name, args) = parse_function_call(call);
            (Some(func_name), args)
        }
        None => (None, Vec::new()),
    };

    TemplateSegment::Variable { name, format, function, args }
}

/// 関数呼び出し部を分解する。関数名は `(` で終端し、引数はカンマ区切り。
fn parse_function_call(call: &str) -> (String, Vec<String>) {
    match call.find('(') {
        Some(idx) => {
            let name = call[..idx].to_string();
            let rest = call[idx + 1..].strip_suffix(')').unwrap_or(&call[idx + 1..]);
            let args = if rest.is_empty() {
                Vec::new()
            } else {
                rest.split(',').map(|a| a.to_string()).collect()
            };
            (name, args)
        }
        None => (call.to_string(), Vec::new()),
    }
}
