//! DTO → [`ComplainerDef`] conversion.
//!
//! Only what TOML alone can get wrong is checked here (severity spelling,
//! hook selection); rule-level validation is left to the registry so that
//! TOML and Rust-defined rules fail the same way.

use crate::hooks;
use crate::pattern::{Capture, RegexCapture, RegexOptions};
use crate::registry::{ComplainerDef, LoadError};
use crate::types::Severity;

use super::config_dto::{ComplainerDto, DeclarativeConfigDto};

/// Converts a `DeclarativeConfigDto` into complainer definitions.
///
/// # Errors
///
/// Returns the first error encountered during conversion.
pub fn load(dto: DeclarativeConfigDto) -> Result<Vec<ComplainerDef>, LoadError> {
    dto.complainers
        .into_iter()
        .enumerate()
        .map(|(i, c)| convert_complainer(c, i))
        .collect()
}

fn convert_complainer(dto: ComplainerDto, index: usize) -> Result<ComplainerDef, LoadError> {
    let ctx = if dto.name.is_empty() {
        format!("complainer[{index}]")
    } else {
        format!("complainer '{}'", dto.name)
    };
    let severity = parse_severity(&dto.severity, &ctx)?;

    let options = RegexOptions {
        case_insensitive: dto.case_insensitive,
        multi_line: dto.multi_line,
        dot_matches_new_line: dto.dot_matches_new_line,
        ignore_whitespace: dto.ignore_whitespace,
    };

    let mut def = ComplainerDef {
        name: dto.name,
        description: dto.description,
        capture: dto
            .capture
            .map(|src| Capture::Regex(RegexCapture::new(src).with_options(options))),
        severity: Some(severity),
        include: dto.glob,
        exclude: dto.exclude_glob,
        help: dto.help,
        hook: None,
    };

    if let Some(marker) = dto.skip_commented {
        if marker.is_empty() {
            return Err(LoadError::MissingField {
                rule: def.name,
                field: "skip_commented",
            });
        }
        def = def.hook(hooks::skip_commented(marker));
    }
    Ok(def)
}

fn parse_severity(value: &str, context: &str) -> Result<Severity, LoadError> {
    Severity::parse(value).ok_or_else(|| LoadError::UnknownSeverity {
        context: context.to_string(),
        value: value.to_string(),
    })
}
