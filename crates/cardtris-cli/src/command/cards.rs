use std::path::PathBuf;

use cardtris_engine::{CATALOG, CardTemplate};
use serde::Serialize;

use crate::{profile::UNLOCK_THRESHOLDS, util};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct CardsArg {
    /// Output file (JSON); stdout when omitted
    #[clap(long, short)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CatalogEntry {
    index: usize,
    unlock_score: u64,
    #[serde(flatten)]
    template: CardTemplate,
}

fn catalog_entries() -> Vec<CatalogEntry> {
    CATALOG
        .iter()
        .zip(UNLOCK_THRESHOLDS)
        .enumerate()
        .map(|(index, (template, unlock_score))| CatalogEntry {
            index,
            unlock_score,
            template: *template,
        })
        .collect()
}

pub(crate) fn run(arg: &CardsArg) -> anyhow::Result<()> {
    util::save_json(&catalog_entries(), arg.output.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_flat_json() {
        let entries = catalog_entries();
        let json = serde_json::to_value(&entries[17]).unwrap();
        assert_eq!(json["index"], 17);
        assert_eq!(json["unlock_score"], 150_000);
        assert_eq!(json["name"], "Tetris God");
        assert_eq!(json["rarity"], "legendary");
    }
}
