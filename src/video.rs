//! ffmpeg invocation for turning snapshots into a video
//!
//! The figures directory is concatenated with `*.png` as-is, so `figs/`
//! matches every PNG inside it while `figs` would match `figs*.png` next to
//! it. The glob is expanded by ffmpeg (`-pattern_type glob`), not a shell.

use std::fmt;
use std::process::{Command, ExitStatus};

/// Default figures directory
pub const DEFAULT_FIGS: &str = "figs/";
/// Default frames per second
pub const DEFAULT_FRAMERATE: i64 = 4;
/// Default output file
pub const DEFAULT_OUT: &str = "mnist-gan.mp4";

/// Text printed when the assembler starts
pub const BANNER: &str = "
Video Generator Utility
=======================
Generate videos from your training images.
Note: This program requires ffmpeg on your machine.
";

/// An `ffmpeg` call stitching numbered snapshots into an H.264 video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCommand {
    /// Directory prefix of the snapshots
    pub figs: String,
    /// Images shown per second
    pub framerate: i64,
    /// Output video file, created or overwritten
    pub out: String,
}

impl Default for VideoCommand {
    fn default() -> Self {
        Self {
            figs: DEFAULT_FIGS.to_string(),
            framerate: DEFAULT_FRAMERATE,
            out: DEFAULT_OUT.to_string(),
        }
    }
}

impl VideoCommand {
    pub fn new(figs: impl Into<String>, framerate: i64, out: impl Into<String>) -> Self {
        Self {
            figs: figs.into(),
            framerate,
            out: out.into(),
        }
    }

    /// Executable name
    pub fn program(&self) -> &'static str {
        "ffmpeg"
    }

    /// Glob handed to ffmpeg's `-i`
    pub fn input_pattern(&self) -> String {
        format!("{}*.png", self.figs)
    }

    /// Arguments passed to ffmpeg
    pub fn args(&self) -> Vec<String> {
        vec![
            "-framerate".to_string(),
            self.framerate.to_string(),
            "-pattern_type".to_string(),
            "glob".to_string(),
            "-i".to_string(),
            self.input_pattern(),
            "-c:v".to_string(),
            "libx264".to_string(),
            self.out.clone(),
        ]
    }

    /// Run ffmpeg and wait for it to exit
    ///
    /// ffmpeg inherits stdin, stdout and stderr. The exit status is returned
    /// as-is; an error only means the process could not be started.
    pub fn run(&self) -> std::io::Result<ExitStatus> {
        Command::new(self.program()).args(self.args()).status()
    }
}

impl fmt::Display for VideoCommand {
    /// Shell form of the command, with the glob quoted
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -framerate {} -pattern_type glob -i '{}' -c:v libx264 {}",
            self.program(),
            self.framerate,
            self.input_pattern(),
            self.out
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_COMMAND: &str =
        "ffmpeg -framerate 4 -pattern_type glob -i 'figs/*.png' -c:v libx264 mnist-gan.mp4";

    fn tokens(command: &VideoCommand) -> Vec<String> {
        command.to_string().split(' ').map(str::to_string).collect()
    }

    fn changed_positions(a: &VideoCommand, b: &VideoCommand) -> Vec<usize> {
        let (ta, tb) = (tokens(a), tokens(b));
        assert_eq!(ta.len(), tb.len());
        ta.iter()
            .zip(tb.iter())
            .enumerate()
            .filter(|(_, (x, y))| x != y)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_default_command() {
        assert_eq!(VideoCommand::default().to_string(), DEFAULT_COMMAND);
    }

    #[test]
    fn test_framerate_override() {
        let base = VideoCommand::default();
        let command = VideoCommand {
            framerate: 12,
            ..VideoCommand::default()
        };

        assert_eq!(changed_positions(&base, &command), vec![2]);
        assert!(command.to_string().contains("-framerate 12 "));
    }

    #[test]
    fn test_figs_override() {
        let base = VideoCommand::default();
        let command = VideoCommand {
            figs: "runs/one/".to_string(),
            ..VideoCommand::default()
        };

        assert_eq!(changed_positions(&base, &command), vec![6]);
        assert!(command.to_string().contains("-i 'runs/one/*.png' "));
    }

    #[test]
    fn test_out_override() {
        let base = VideoCommand::default();
        let command = VideoCommand {
            out: "digits.mp4".to_string(),
            ..VideoCommand::default()
        };

        assert_eq!(changed_positions(&base, &command), vec![9]);
        assert!(command.to_string().ends_with("libx264 digits.mp4"));
    }

    #[test]
    fn test_args_match_display() {
        let command = VideoCommand::new("figs/", 4, "mnist-gan.mp4");
        let mut shell = vec![command.program().to_string()];
        shell.extend(command.args());

        // Only the quoting of the glob differs
        let joined = shell.join(" ").replace("figs/*.png", "'figs/*.png'");
        assert_eq!(joined, DEFAULT_COMMAND);
    }

    #[test]
    fn test_unvalidated_values_pass_through() {
        let command = VideoCommand::new("figs", -1, "out.mp4");
        assert_eq!(command.input_pattern(), "figs*.png");
        assert_eq!(command.args()[1], "-1");
    }
}
