use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::program::DemoProgram;
use crate::replay::ReplayReport;
use crate::variants::{load_config_from_path, DemoConfig};

#[derive(Parser, Debug)]
#[command(name = "bunny_demo", about = "Scrolling bunny grid with a keyboard-driven camera")]
pub struct Cli {
    /// Built-in variant: basic, tinted or explorer
    #[arg(long, default_value = "basic")]
    pub variant: String,

    /// JSON variant file; takes precedence over --variant
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Lua control script, relative to the asset root unless absolute
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Ignore any script the variant names and use the built-in controls
    #[arg(long, conflicts_with = "script")]
    pub no_script: bool,

    /// Asset root directory
    #[arg(long, default_value = "assets")]
    pub assets: PathBuf,

    /// Run without a window or GPU and print a summary
    #[arg(long)]
    pub headless: bool,

    /// Replay file to drive a headless run
    #[arg(long, requires = "headless")]
    pub replay: Option<PathBuf>,

    /// Idle frames to run headless when no replay is given
    #[arg(
        long,
        default_value_t = 60,
        conflicts_with = "replay",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub frames: u32,

    /// Master volume (1.0 = unity); overrides the variant's volume
    #[arg(long)]
    pub volume: Option<f32>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn demo_config(&self) -> Result<DemoConfig, String> {
        let mut config = match &self.config {
            Some(path) => load_config_from_path(path)?,
            None => DemoConfig::preset(&self.variant)?,
        };
        if let Some(volume) = self.volume {
            config.volume = volume;
            config.validate()?;
        }
        Ok(config)
    }

    /// Script to run, if any: `--script` wins over the variant's own script.
    pub fn script_path(&self, config: &DemoConfig) -> Option<PathBuf> {
        if self.no_script {
            return None;
        }
        let relative = match &self.script {
            Some(path) => path.clone(),
            None => PathBuf::from(config.script.as_ref()?),
        };
        Some(resolve_under(&self.assets, &relative))
    }
}

fn resolve_under(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

pub fn headless_summary(program: &DemoProgram, report: &ReplayReport) -> String {
    let state = program.state();
    let camera = state.camera;
    let audio = if report.audio_requests.is_empty() {
        "none".to_string()
    } else {
        report.audio_requests.join(", ")
    };

    let mut out = String::new();
    let _ = writeln!(out, "variant: {}", program.config().name);
    let _ = writeln!(out, "frames: {}", report.frames_run);
    let _ = writeln!(out, "elapsed: {:.3}s", report.elapsed);
    let _ = writeln!(out, "offset: {:.2}", state.offset);
    let _ = writeln!(
        out,
        "camera: position=({:.2}, {:.2}) rotation={:.3} zoom={:.3}",
        camera.position.x, camera.position.y, camera.rotation, camera.zoom
    );
    let _ = writeln!(out, "sprites: {}", report.last_frame_commands);
    let _ = writeln!(out, "audio: {audio}");
    let _ = writeln!(out, "script: {}", program.script_status());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::DemoState;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("bunny_demo").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_select_basic_windowed() {
        let cli = parse(&[]).expect("parse");
        assert_eq!(cli.variant, "basic");
        assert_eq!(cli.assets, PathBuf::from("assets"));
        assert!(!cli.headless);
        assert_eq!(cli.frames, 60);
        assert_eq!(cli.demo_config().expect("preset").name, "basic");
    }

    #[test]
    fn replay_requires_headless() {
        assert!(parse(&["--replay", "r.json"]).is_err());
        assert!(parse(&["--headless", "--replay", "r.json"]).is_ok());
        assert!(parse(&["--headless", "--replay", "r.json", "--frames", "5"]).is_err());
    }

    #[test]
    fn zero_frames_is_rejected() {
        assert!(parse(&["--headless", "--frames", "0"]).is_err());
        let cli = parse(&["--headless", "--frames", "1"]).expect("parse");
        assert_eq!(cli.frames, 1);
    }

    #[test]
    fn volume_override_is_validated() {
        let cli = parse(&["--variant", "tinted", "--volume", "0.4"]).expect("parse");
        assert_eq!(cli.demo_config().expect("config").volume, 0.4);

        let cli = parse(&["--volume=-2"]).expect("parse");
        assert!(cli.demo_config().unwrap_err().contains("volume"));
    }

    #[test]
    fn unknown_variant_surfaces_as_error() {
        let cli = parse(&["--variant", "giant"]).expect("parse");
        assert!(cli.demo_config().unwrap_err().contains("giant"));
    }

    #[test]
    fn script_resolution_order() {
        let cli = parse(&["--assets", "data"]).expect("parse");
        let basic = DemoConfig::basic();
        assert_eq!(
            cli.script_path(&basic),
            Some(PathBuf::from("data").join("scripts/bunnies.lua"))
        );
        assert_eq!(cli.script_path(&DemoConfig::explorer()), None);

        let cli = parse(&["--script", "custom.lua"]).expect("parse");
        assert_eq!(
            cli.script_path(&DemoConfig::explorer()),
            Some(PathBuf::from("assets").join("custom.lua"))
        );

        let cli = parse(&["--no-script"]).expect("parse");
        assert_eq!(cli.script_path(&basic), None);
    }

    #[test]
    fn summary_lists_final_state() {
        let program = DemoProgram::new(DemoConfig::basic(), None);
        let report = ReplayReport {
            frames_run: 3,
            elapsed: 3.0,
            last_frame_commands: 21,
            audio_requests: Vec::new(),
        };
        assert_eq!(program.state(), &DemoState::new());
        let summary = headless_summary(&program, &report);
        assert!(summary.contains("variant: basic\n"));
        assert!(summary.contains("frames: 3\n"));
        assert!(summary.contains("offset: 0.00\n"));
        assert!(summary.contains("camera: position=(0.00, 0.00) rotation=0.000 zoom=1.000\n"));
        assert!(summary.contains("sprites: 21\n"));
        assert!(summary.contains("audio: none\n"));
        assert!(summary.contains("script: Lua: fallback\n"));
    }
}
