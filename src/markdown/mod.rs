//! Markdown Table Codec
//!
//! Markdownのパイプテーブルと[`Table`](crate::Table)を相互に変換するモジュール。
//! 完全なMarkdownパーサーではなく、セルのテキストのみを扱います。

mod parser;
mod renderer;

pub use parser::extract_tables;
pub use renderer::{render_sheets, render_table};
