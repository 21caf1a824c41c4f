#[cfg(feature = "yarax")]
use super::error::UtilsError;
#[cfg(feature = "yarax")]
use log::error;
#[cfg(feature = "yarax")]
use yara_x::{Compiler, Rules, Scanner};

#[cfg(feature = "yarax")]
/// Compile a set of Yara-X rule sources into one ruleset
pub(crate) fn compile_rules(sources: &[String]) -> Result<Rules, UtilsError> {
    let mut compile = Compiler::new();
    compile.error_on_slow_pattern(true);
    for source in sources {
        let status = compile.add_source(source.as_str());
        if let Err(result) = status {
            error!("[yara] Failed to add yara rule: {result:?}");
            return Err(UtilsError::YaraRule);
        }
    }

    Ok(compile.build())
}

#[cfg(feature = "yarax")]
/// Scan bytes using Yara-X. Returns identifiers of matching rules
pub(crate) fn scan_bytes(data: &[u8], rules: &Rules) -> Result<Vec<String>, UtilsError> {
    let mut scanner = Scanner::new(rules);
    let results = scanner.scan(data);
    let hits = match results {
        Ok(result) => result,
        Err(err) => {
            error!("[yara] Failed to scan bytes: {err:?}");
            return Err(UtilsError::YaraScan);
        }
    };
    let mut matches = Vec::new();
    for hit in hits.matching_rules() {
        matches.push(hit.identifier().to_string());
    }
    Ok(matches)
}
