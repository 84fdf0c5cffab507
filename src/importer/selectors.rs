// ==========================================
// Setup Sheet Analyzer - Report selectors
// ==========================================
// Scope: positional CSS selectors of the one supported report layout
// Rule: compiled-in constants; parallel groups are index-aligned
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use scraper::Selector;

pub const SETUP_SHEET_NAME: &str = "table:first-of-type td:nth-of-type(2) span";

pub const TOOL_ID: &str = "table:nth-of-type(5) > tbody > tr > td > table > tbody > tr:nth-of-type(1) > td:nth-of-type(3n-2) > span:nth-of-type(1)";
pub const TOOL_NAME: &str = "table:nth-of-type(5) > tbody > tr > td > table > tbody > tr:nth-of-type(1) > td:nth-of-type(3n-2) > span:nth-of-type(6)";
pub const TOOL_DIAMETER: &str = "table:nth-of-type(5) > tbody > tr > td > table > tbody > tr:nth-of-type(2) > td:nth-of-type(1) > span:nth-of-type(16n+2)";

pub const OPERATION_TYPE: &str =
    "table:nth-of-type(7) > tbody > tr:nth-of-type(5n+1) > td:nth-of-type(2) > span:nth-of-type(2)";
pub const OPERATION_TIME: &str =
    "table:nth-of-type(7) > tbody > tr:nth-of-type(5n+2) > td:last-of-type span";
pub const OPERATION_TOOL_ID: &str =
    "table:nth-of-type(7) > tbody > tr:nth-of-type(5n+3) > td:first-of-type span";

// ==========================================
// Compiled selector set
// ==========================================
#[derive(Debug, Clone)]
pub struct ReportSelectors {
    pub sheet_name: Selector,
    pub tool_id: Selector,
    pub tool_name: Selector,
    pub tool_diameter: Selector,
    pub operation_type: Selector,
    pub operation_time: Selector,
    pub operation_tool_id: Selector,
}

fn compile(css: &str) -> ImportResult<Selector> {
    Selector::parse(css).map_err(|e| ImportError::InvalidSelector(format!("{}: {}", css, e)))
}

impl ReportSelectors {
    pub fn compile() -> ImportResult<Self> {
        Ok(Self {
            sheet_name: compile(SETUP_SHEET_NAME)?,
            tool_id: compile(TOOL_ID)?,
            tool_name: compile(TOOL_NAME)?,
            tool_diameter: compile(TOOL_DIAMETER)?,
            operation_type: compile(OPERATION_TYPE)?,
            operation_time: compile(OPERATION_TIME)?,
            operation_tool_id: compile(OPERATION_TOOL_ID)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_selectors_compile() {
        assert!(ReportSelectors::compile().is_ok());
    }

    #[test]
    fn test_invalid_selector_reported() {
        let err = compile("table:nth-of-type(").unwrap_err();
        assert!(matches!(err, ImportError::InvalidSelector(_)));
    }
}
