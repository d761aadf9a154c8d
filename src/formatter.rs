//! Formatter Module
//!
//! ワークブックのセル値を表のセル文字列に変換するモジュール。

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Excelが扱える最大のシリアル値（9999-12-31 23:59:59）
const MAX_SERIAL_VALUE: f64 = 2_958_465.999_99;

/// セルフォーマッター
///
/// calamineのセル値を文字列に変換するファサードとして機能します。
#[derive(Debug, Default)]
pub(crate) struct CellFormatter {
    /// 日付フォーマッター
    date_formatter: DateFormatter,
}

impl CellFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// セル値をフォーマット
    ///
    /// # 変換規則
    ///
    /// - 整数、および小数部のない浮動小数点数: `3`
    /// - その他の浮動小数点数: 最短の往復可能表現（`1.5`）
    /// - 論理値: `True` / `False`
    /// - 日付: `%Y-%m-%d %H:%M:%S`
    /// - ISO 8601形式の日付・期間: そのまま
    /// - エラー値: Excelのエラーコード（`#DIV/0!`）
    /// - 空セル: 空文字列
    pub fn format_cell(&self, cell: &Data) -> String {
        match cell {
            Data::Int(i) => i.to_string(),
            Data::Float(f) => format_number(*f),
            Data::String(s) => s.clone(),
            Data::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Data::DateTime(dt) => self
                .date_formatter
                .format(dt.as_f64())
                .unwrap_or_else(|| format_number(dt.as_f64())),
            Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
            Data::Error(e) => e.to_string(),
            Data::Empty => String::new(),
        }
    }

    /// セルが空（空セルまたは空白のみの文字列）かどうか
    pub fn is_blank(&self, cell: &Data) -> bool {
        match cell {
            Data::Empty => true,
            Data::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// 数値を文字列に変換
///
/// 小数部がなく、f64で正確に表現できる範囲の値は整数として出力します。
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// 日付フォーマッター
///
/// Excelのシリアル日付値を文字列に変換します。
/// 常に1900年エポックとして処理します。
#[derive(Debug, Default)]
pub(crate) struct DateFormatter;

impl DateFormatter {
    /// シリアル値を`%Y-%m-%d %H:%M:%S`形式に変換
    ///
    /// # エポックシステム
    ///
    /// 1900年システム: 1899年12月30日起算（Excelの1900年うるう年バグにより、
    /// シリアル値61以降はこの起算日で正しい日付になる）
    ///
    /// # 戻り値
    ///
    /// * `Some(String)` - 変換に成功した場合
    /// * `None` - 範囲外の値の場合
    pub fn format(&self, serial_value: f64) -> Option<String> {
        self.to_datetime(serial_value)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
    }

    fn to_datetime(&self, serial_value: f64) -> Option<NaiveDateTime> {
        if !serial_value.is_finite() || !(0.0..=MAX_SERIAL_VALUE).contains(&serial_value) {
            return None;
        }

        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
        let days = serial_value.floor() as i64;
        let seconds = ((serial_value - serial_value.floor()) * 86_400.0).round() as i64;

        epoch
            .checked_add_signed(Duration::try_days(days)?)?
            .checked_add_signed(Duration::try_seconds(seconds)?)
    }
}
