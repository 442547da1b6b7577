/// 拡張子からカテゴリへの固定対応表
pub fn category_for_extension(extension: &str) -> &'static str {
    match extension.trim_start_matches('.').to_lowercase().as_str() {
        "pdf" | "doc" | "docx" | "txt" | "rtf" | "odt" | "md" => "Documents",
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" | "tiff" | "heic" => "Images",
        "mp4" | "avi" | "mkv" | "mov" | "wmv" | "webm" | "flv" => "Videos",
        "mp3" | "wav" | "flac" | "aac" | "ogg" | "m4a" | "wma" => "Audio",
        "zip" | "rar" | "7z" | "tar" | "gz" | "bz2" => "Archives",
        "exe" | "msi" | "dmg" | "pkg" | "deb" | "rpm" | "app" | "apk" => "Applications",
        "xls" | "xlsx" | "csv" | "ods" => "Spreadsheets",
        "ppt" | "pptx" | "odp" | "key" => "Presentations",
        _ => "Other",
    }
}
