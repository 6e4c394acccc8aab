//! Image composition
//!
//! Everything that touches the image builder: typed tags, cache keys,
//! scoped build contexts, the three-layer assembler, and publishing.

pub mod assemble;
pub mod builder;
pub mod context;
pub mod key;
pub mod publish;
pub mod tag;

pub use assemble::{Assembly, LayerAssembler, LayerOutcome};
pub use builder::{DockerCli, ImageBuilder};
pub use context::BuildContext;
pub use key::CacheKey;
pub use publish::publish;
pub use tag::{ImageTag, TagSet};

/// Max number of output lines to include in build error messages.
const BUILD_ERROR_TAIL_LINES: usize = 50;

/// Extract the useful tail of build output for error diagnostics.
///
/// Combines stdout and stderr, then returns the last `BUILD_ERROR_TAIL_LINES`
/// lines so error messages are actionable without being overwhelming.
pub(crate) fn build_error_output(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let total = lines.len();
    let tail: Vec<&str> = if total > BUILD_ERROR_TAIL_LINES {
        lines[total - BUILD_ERROR_TAIL_LINES..].to_vec()
    } else {
        lines
    };
    tail.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_error_output_keeps_short_output() {
        let out = build_error_output("line1\nline2", "err1");
        assert_eq!(out, "line1\nline2\nerr1");
    }

    #[test]
    fn build_error_output_truncates_to_tail() {
        let stdout: String = (0..100)
            .map(|i| format!("line{}\n", i))
            .collect();
        let out = build_error_output(&stdout, "");
        assert_eq!(out.lines().count(), BUILD_ERROR_TAIL_LINES);
        assert!(out.starts_with("line50"));
        assert!(out.ends_with("line99"));
    }
}
