//! Bridges `indent-config` data into scanner and host options.

use indent_config::{GrammarKind, IndentConfig, ScannerSettings};

use crate::host::{GrammarPolicy, HostOptions};
use crate::scanner::ScannerConfig;

impl From<&ScannerSettings> for ScannerConfig {
    fn from(settings: &ScannerSettings) -> Self {
        ScannerConfig::new()
            .with_max_depth(settings.max_depth)
            .with_comment_char(settings.comment_char)
    }
}

impl From<GrammarKind> for GrammarPolicy {
    fn from(kind: GrammarKind) -> Self {
        match kind {
            GrammarKind::Permissive => GrammarPolicy::Permissive,
            GrammarKind::ColonBlocks => GrammarPolicy::ColonBlocks,
        }
    }
}

/// Host options described by a loaded configuration. Tracing is a per-run choice and stays off.
pub fn host_options(config: &IndentConfig) -> HostOptions {
    HostOptions {
        scanner: ScannerConfig::from(&config.scanner),
        grammar: GrammarPolicy::from(config.output.grammar),
        trace: false,
    }
}
