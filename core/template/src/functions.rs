use std::collections::HashMap;
use tidydrive_types::TidyDriveError;

/// テンプレート関数: 純粋な文字列変換。入力1つと可変長の文字列引数を取る。
pub type TemplateFn =
    Box<dyn Fn(&str, &[String]) -> Result<String, TidyDriveError> + Send + Sync>;

/// 名前→関数の動的ディスパッチ表。実行時にユーザー拡張できる。
pub struct FunctionRegistry {
    functions: HashMap<String, TemplateFn>,
}

impl FunctionRegistry {
    /// 組み込み関数入りのレジストリを作る
    pub fn new() -> Self {
        let mut registry = Self { functions: HashMap::new() };
        registry.register_builtins();
        registry
    }

    pub fn register<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&str, &[String]) -> Result<String, TidyDriveError> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_lowercase(), Box::new(function));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_lowercase())
    }

    /// 関数を適用する。未登録なら `None`。
    pub fn apply(
        &self,
        name: &str,
        input: &str,
        args: &[String],
    ) -> Option<Result<String, TidyDriveError>> {
        self.functions
            .get(&name.to_lowercase())
            .map(|f| f(input, args))
    }

    fn register_builtins(&mut self) {
        self.register("upper", |input, _| Ok(input.to_uppercase()));
        self.register("lower", |input, _| Ok(input.to_lowercase()));
        self.register("trim", |input, _| Ok(input.trim().to_string()));
        self.register("title", |input, _| Ok(title_case(input)));

        self.register("replace", |input, args| {
            let (old, new) = two_args("replace", args)?;
            Ok(input.replace(old, new))
        });

        self.register("remove", |input, args| {
            let substr = one_arg("remove", args)?;
            Ok(input.replace(substr, ""))
        });

        self.register("substring", |input, args| {
            let start: usize = parse_arg("substring", args.first())?;
            let chars: Vec<char> = input.chars().collect();
            if start >= chars.len() {
                return Ok(String::new());
            }
            let end = match args.get(1) {
                Some(len) => {
                    let length: usize = len.parse().map_err(|_| arg_error("substring", len))?;
                    (start + length).min(chars.len())
                }
                None => chars.len(),
            };
            Ok(chars[start..end].iter().collect())
        });

        self.register("sanitize", |input, _| Ok(sanitize(input)));

        self.register("alphanumeric", |input, _| {
            Ok(input
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
                .collect())
        });

        self.register("pad", |input, args| {
            let width: usize = parse_arg("pad", args.first())?;
            let pad_char = args
                .get(1)
                .and_then(|a| a.chars().next())
                .unwrap_or('0');
            let len = input.chars().count();
            if len >= width {
                return Ok(input.to_string());
            }
            let mut padded: String = std::iter::repeat(pad_char).take(width - len).collect();
            padded.push_str(input);
            Ok(padded)
        });

        self.register("truncate", |input, args| {
            let max: usize = parse_arg("truncate", args.first())?;
            let suffix = args.get(1).map(|s| s.as_str()).unwrap_or("...");
            let chars: Vec<char> = input.chars().collect();
            if chars.len() <= max {
                return Ok(input.to_string());
            }
            let keep = max.saturating_sub(suffix.chars().count());
            let mut out: String = chars[..keep].iter().collect();
            out.push_str(suffix);
            Ok(out)
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// 空白区切りの各語の先頭を大文字化する
fn title_case(input: &str) -> String {
    input
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// ファイルシステムで無効な文字を `_` に置換し、連続を畳み、前後の `_` を落とす
fn sanitize(input: &str) -> String {
    let replaced: String = input
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let mut collapsed = String::with_capacity(replaced.len());
    let mut prev_underscore = false;
    for c in replaced.chars() {
        if c == '_' {
            if !prev_underscore {
                collapsed.push(c);
            }
            prev_underscore = true;
        } else {
            collapsed.push(c);
            prev_underscore = false;
        }
    }

    collapsed.trim_matches('_').to_string()
}

fn one_arg<'a>(name: &str, args: &'a [String]) -> Result<&'a str, TidyDriveError> {
    args.first().map(|s| s.as_str()).ok_or_else(|| TidyDriveError::Template {
        message: format!("Function '{}' requires one argument", name),
    })
}

fn two_args<'a>(name: &str, args: &'a [String]) -> Result<(&'a str, &'a str), TidyDriveError> {
    match (args.first(), args.get(1)) {
        (Some(a), Some(b)) => Ok((a.as_str(), b.as_str())),
        _ => Err(TidyDriveError::Template {
            message: format!("Function '{}' requires two arguments", name),
        }),
    }
}

fn parse_arg(name: &str, arg: Option<&String>) -> Result<usize, TidyDriveError> {
    let arg = arg.ok_or_else(|| TidyDriveError::Template {
        message: format!("Function '{}' requires a numeric argument", name),
    })?;
    arg.parse().map_err(|_| arg_error(name, arg))
}

fn arg_error(name: &str, arg: &str) -> TidyDriveError {
    TidyDriveError::Template {
        message: format!("Invalid argument '{}' for function '{}'", arg, name),
    }
}
