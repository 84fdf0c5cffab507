// ==========================================
// Setup Sheet Analyzer - Setup sheet parser
// ==========================================
// Scope: one HTML report -> one SetupSheet with per-tool usage
// Stages:
//   1. sheet title
//   2. tool declarations (id / name / diameter, index-aligned)
//   3. operation log (type / duration / tool id, index-aligned)
// Rule: all-or-nothing, a partially scraped sheet is never returned
// ==========================================

use crate::domain::setup_sheet::SetupSheet;
use crate::domain::tool::ToolRecord;
use crate::importer::classifier::OperationClassifier;
use crate::importer::duration::parse_hhmmss;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::selectors::ReportSelectors;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

fn cell_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn select_texts(document: &Html, selector: &Selector) -> Vec<String> {
    document.select(selector).map(cell_text).collect()
}

// ==========================================
// SetupSheetParser
// ==========================================
#[derive(Debug, Clone)]
pub struct SetupSheetParser {
    selectors: ReportSelectors,
    classifier: OperationClassifier,
}

impl SetupSheetParser {
    pub fn new() -> ImportResult<Self> {
        Ok(Self {
            selectors: ReportSelectors::compile()?,
            classifier: OperationClassifier::new(),
        })
    }

    /// Parse raw report text.
    pub fn parse_str(&self, content: &str, file_name: &str) -> ImportResult<SetupSheet> {
        let document = Html::parse_document(content);
        self.parse(&document, file_name)
    }

    /// Parse an already built document tree.
    ///
    /// # Errors
    /// - `CorruptedFile`: a structural assumption of the report layout broke
    /// - `UnknownOperation`: an operation code matched no category
    pub fn parse(&self, document: &Html, file_name: &str) -> ImportResult<SetupSheet> {
        let name = self.scan_name(document, file_name)?;
        let mut sheet = SetupSheet::new(name, file_name);

        let tool_index = self.scan_tools(document, &mut sheet)?;
        let operation_count = self.scan_times(document, &mut sheet, &tool_index)?;

        tracing::debug!(
            file_name,
            sheet_name = %sheet.name,
            tools = sheet.tools.len(),
            operations = operation_count,
            "setup sheet parsed"
        );
        Ok(sheet)
    }

    // ===== Stage 1: title =====

    fn scan_name(&self, document: &Html, file_name: &str) -> ImportResult<String> {
        document
            .select(&self.selectors.sheet_name)
            .next()
            .map(cell_text)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ImportError::corrupted("Setup sheet name not found", file_name))
    }

    // ===== Stage 2: tool declarations =====

    /// # Returns
    /// Source-local tool id -> index into `sheet.tools`
    fn scan_tools(
        &self,
        document: &Html,
        sheet: &mut SetupSheet,
    ) -> ImportResult<HashMap<String, usize>> {
        let ids = select_texts(document, &self.selectors.tool_id);
        let names = select_texts(document, &self.selectors.tool_name);
        let diameters = select_texts(document, &self.selectors.tool_diameter);

        if ids.len() != names.len() || ids.len() != diameters.len() {
            return Err(ImportError::corrupted(
                format!(
                    "Tool table is misaligned (ids={}, names={}, diameters={})",
                    ids.len(),
                    names.len(),
                    diameters.len()
                ),
                sheet.file_name.clone(),
            ));
        }

        let mut index = HashMap::with_capacity(ids.len());
        for ((id, name), raw_diameter) in ids.into_iter().zip(names).zip(diameters) {
            let diameter = raw_diameter
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite())
                .ok_or_else(|| {
                    ImportError::corrupted(
                        format!("Invalid diameter '{}' for tool {}", raw_diameter, name),
                        sheet.file_name.clone(),
                    )
                })?;
            let position = sheet.save_tool(ToolRecord::new(id.clone(), name, diameter));
            index.insert(id, position);
        }
        Ok(index)
    }

    // ===== Stage 3: operation log =====

    fn scan_times(
        &self,
        document: &Html,
        sheet: &mut SetupSheet,
        tool_index: &HashMap<String, usize>,
    ) -> ImportResult<usize> {
        let tool_ids = select_texts(document, &self.selectors.operation_tool_id);
        let operation_types = select_texts(document, &self.selectors.operation_type);
        let times = select_texts(document, &self.selectors.operation_time);

        if times.len() != tool_ids.len() || times.len() != operation_types.len() {
            return Err(ImportError::corrupted(
                format!(
                    "Operation table is misaligned (types={}, times={}, tool ids={})",
                    operation_types.len(),
                    times.len(),
                    tool_ids.len()
                ),
                sheet.file_name.clone(),
            ));
        }

        let count = times.len();
        for ((tool_id, raw_operation), time) in tool_ids.iter().zip(&operation_types).zip(&times) {
            let seconds = parse_hhmmss(time).ok_or_else(|| {
                ImportError::corrupted(
                    format!("Invalid operation duration '{}'", time),
                    sheet.file_name.clone(),
                )
            })?;

            let position = *tool_index.get(tool_id).ok_or_else(|| {
                ImportError::corrupted(
                    format!("Tool ID not found: {}", tool_id),
                    sheet.file_name.clone(),
                )
            })?;

            let category = self.classifier.classify(raw_operation, &sheet.file_name)?;
            sheet.tools[position].add_usage(category, seconds as f64);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::OperationCategory;

    const TWO_TOOLS: &str = include_str!("../../tests/fixtures/setup_sheet_two_tools.html");

    fn parser() -> SetupSheetParser {
        SetupSheetParser::new().unwrap()
    }

    #[test]
    fn test_parse_fixture() {
        let sheet = parser().parse_str(TWO_TOOLS, "two_tools.html").unwrap();

        assert_eq!(sheet.name, "BRACKET-OP10");
        assert_eq!(sheet.file_name, "two_tools.html");
        assert_eq!(sheet.tools.len(), 2);

        let em = sheet.tool_by_name("EM10-4F").unwrap();
        assert_eq!(em.id, "1");
        assert_eq!(em.diameter, 10.0);
        // 00:02:00 + 01:02:03 rough, 00:00:30 finish
        assert_eq!(em.usage[OperationCategory::Rough], 120.0 + 3723.0);
        assert_eq!(em.usage[OperationCategory::Finish], 30.0);
        assert_eq!(em.sources, vec![sheet.key]);

        let drill = sheet.tool_by_name("DR6.8").unwrap();
        assert_eq!(drill.id, "2");
        assert_eq!(drill.diameter, 6.8);
        assert_eq!(drill.usage[OperationCategory::Drilling], 45.0);
        assert_eq!(drill.usage.total(), 45.0);
    }

    #[test]
    fn test_missing_title_is_corrupted() {
        let html = TWO_TOOLS.replace("<span>BRACKET-OP10</span>", "");
        let err = parser().parse_str(&html, "no_title.html").unwrap_err();
        assert!(matches!(err, ImportError::CorruptedFile { ref file_name, .. } if file_name == "no_title.html"));
    }

    #[test]
    fn test_undeclared_tool_is_corrupted() {
        let html = TWO_TOOLS.replace("<td><span>2</span></td>", "<td><span>9</span></td>");
        let err = parser().parse_str(&html, "bad_tool.html").unwrap_err();
        match err {
            ImportError::CorruptedFile { description, .. } => {
                assert!(description.contains("Tool ID not found"), "{}", description)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_operation_aborts_sheet() {
        let html = TWO_TOOLS.replace("SPOT_CENTER", "CONTOUR_2D");
        let err = parser().parse_str(&html, "unknown.html").unwrap_err();
        assert_eq!(
            err,
            ImportError::UnknownOperation {
                raw_code: "CONTOUR_2D".to_string(),
                file_name: "unknown.html".to_string(),
            }
        );
    }

    fn assert_corrupted(html: &str, file_name: &str, expected: &str) {
        match parser().parse_str(html, file_name).unwrap_err() {
            ImportError::CorruptedFile {
                description,
                file_name: reported,
            } => {
                assert_eq!(reported, file_name);
                assert!(description.contains(expected), "{}", description);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_tool_name_is_corrupted() {
        let html = TWO_TOOLS.replace("<span>-</span><span>DR6.8</span>", "<span>-</span>");
        assert_corrupted(&html, "no_name.html", "Tool table is misaligned");
    }

    #[test]
    fn test_missing_operation_time_is_corrupted() {
        let html = TWO_TOOLS.replace("<span>00:00:45</span>", "");
        assert_corrupted(&html, "no_time.html", "Operation table is misaligned");
    }

    #[test]
    fn test_invalid_diameter_is_corrupted() {
        let html = TWO_TOOLS.replace("<span>6.8</span>", "<span>abc</span>");
        assert_corrupted(&html, "bad_diameter.html", "Invalid diameter 'abc'");
    }

    #[test]
    fn test_non_finite_diameter_is_corrupted() {
        for raw in ["NaN", "inf", "-infinity"] {
            let html = TWO_TOOLS.replace("<span>6.8</span>", &format!("<span>{}</span>", raw));
            assert_corrupted(&html, "non_finite.html", "Invalid diameter");
        }
    }

    #[test]
    fn test_malformed_duration_is_corrupted() {
        let html = TWO_TOOLS.replace("01:02:03", "01:xx:03");
        assert_corrupted(&html, "bad_time.html", "Invalid operation duration '01:xx:03'");
    }

    #[test]
    fn test_oversized_duration_is_corrupted() {
        let html = TWO_TOOLS.replace("01:02:03", "9999999999999999:00:00");
        assert_corrupted(&html, "huge_time.html", "Invalid operation duration");
    }

    #[test]
    fn test_empty_document_is_corrupted() {
        let err = parser().parse_str("<html><body></body></html>", "empty.html").unwrap_err();
        assert!(matches!(err, ImportError::CorruptedFile { .. }));
    }
}
