// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 替换文件名中非法的字符
///
/// Windows与Unix文件系统均不允许的字符统一替换为下划线。
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

/// 取标题前若干个字符作为输出文件名前缀
///
/// 按字符而非字节截断，空标题回退为固定占位名。
pub fn title_prefix(title: &str, max_chars: usize) -> String {
    let prefix: String = sanitize(title.trim()).chars().take(max_chars).collect();
    if prefix.is_empty() {
        "未命名".to_string()
    } else {
        prefix
    }
}
