//! 출력 형식 전환 (text / JSON)
//!
//! 모든 서브커맨드 결과는 [`OutputWriter`]를 거쳐 출력됩니다.
//! 핸들러는 출력 형식을 직접 분기하지 않습니다.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// 선택된 형식으로 결과를 기록하는 출력기
///
/// 결과 타입은 JSON용 `Serialize`와 텍스트용 [`Render`]를 모두 구현합니다.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// 표준 출력에 기록합니다.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let mut out = std::io::stdout().lock();
        self.render_to(&mut out, payload)
    }

    /// 임의의 writer에 기록합니다. JSON은 들여쓰기한 한 문서입니다.
    pub fn render_to<T: Render + Serialize>(
        &self,
        out: &mut dyn Write,
        payload: &T,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => payload.render_text(out)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, payload)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }

    /// 형식 설정과 무관하게 한 줄짜리 JSON으로 기록합니다 (`scan --raw`).
    pub fn render_json_line<T: Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let mut out = std::io::stdout().lock();
        serde_json::to_writer(&mut out, payload)?;
        writeln!(out)?;
        Ok(())
    }
}

/// 사람이 읽는 텍스트 출력
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        interface: String,
        signals: u32,
    }

    impl Render for Sample {
        fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
            writeln!(w, "Interface: {}", self.interface)?;
            writeln!(w, "Signals: {}", self.signals)
        }
    }

    fn sample() -> Sample {
        Sample {
            interface: "wlan0".to_owned(),
            signals: 7,
        }
    }

    fn written(format: OutputFormat, payload: &Sample) -> String {
        let mut buf = Vec::new();
        OutputWriter::new(format)
            .render_to(&mut buf, payload)
            .expect("render should succeed");
        String::from_utf8(buf).expect("utf-8 output")
    }

    #[test]
    fn text_format_uses_render() {
        let out = written(OutputFormat::Text, &sample());
        assert_eq!(out, "Interface: wlan0\nSignals: 7\n");
    }

    #[test]
    fn json_format_is_pretty_and_newline_terminated() {
        let out = written(OutputFormat::Json, &sample());
        assert!(out.ends_with("}\n"));
        assert!(out.contains("\n  \"interface\""), "expected indentation: {out}");

        let parsed: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
        assert_eq!(parsed["interface"], "wlan0");
        assert_eq!(parsed["signals"], 7);
    }

    #[test]
    fn text_format_keeps_non_ascii_labels() {
        let payload = Sample {
            interface: "카페_와이파이 🦀".to_owned(),
            signals: 0,
        };
        let out = written(OutputFormat::Text, &payload);
        assert!(out.contains("카페_와이파이 🦀"));
    }
}
