//! Subcommand handlers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::args::{ConfigAction, GenerateArgs};
use super::display;
use super::enums::ExportFormat;
use crate::app::{AppController, AppMode, Session};
use crate::config::{default_path as get_config_path, Config, DEFAULT_CONFIG_TEMPLATE};
use crate::content::{Format, UserInputs, PLAYBOOKS};
use crate::export::{file_stem, ExportKind, Exporter, Rasterizer, Stage};
use crate::gemini::GeminiClient;
use crate::prompt::build_video_prompt;
use crate::video::{read_status, CancelHandle, VideoCache};

/// How often the video status line is checked for changes.
const STATUS_REFRESH: Duration = Duration::from_millis(250);

fn runtime() -> Result<tokio::runtime::Runtime, String> {
    tokio::runtime::Runtime::new().map_err(|e| format!("Failed to create runtime: {}", e))
}

/// Build a controller wired to the configured gateway, exporter and video settings.
fn controller(config: &Config) -> Result<AppController, String> {
    let client = GeminiClient::new(config.gateway()).map_err(|e| e.to_string())?;
    let exporter = Exporter::new(Rasterizer::with_scale(config.export.scale));
    let mut controller = AppController::with_exporter(client, exporter)
        .with_poll_policy(config.poll_policy())
        .with_status_interval(config.status_interval());

    if config.video.cache {
        match VideoCache::with_default_dir() {
            Ok(cache) => controller = controller.with_video_cache(cache, config.video.cache_max_mb),
            Err(e) => log::warn!("Video cache disabled: {}", e),
        }
    }
    Ok(controller)
}

fn load_session(path: &Path) -> Result<Session, String> {
    Session::load(path).map_err(|e| format!("{}: {}", path.display(), e))
}

fn output_dir(config: &Config, out: Option<PathBuf>) -> PathBuf {
    out.unwrap_or_else(|| config.export.output_dir.clone())
}

/// Print the built-in playbooks.
pub fn list_playbooks() {
    println!("Available playbooks:");
    println!();
    for playbook in PLAYBOOKS {
        println!("{}", display::render_playbook(playbook));
    }
    println!("Use --playbook <id> with --var KEY=VALUE for each input.");
}

/// Apply generate options on top of the configured defaults.
pub fn build_inputs(config: &Config, args: &GenerateArgs) -> Result<UserInputs, String> {
    let mut inputs = config.default_inputs();

    if let Some(platform) = args.platform {
        inputs.set_platform(platform.into());
    }
    if let Some(format) = args.format {
        let format: Format = format.into();
        if !inputs.platform.formats().contains(&format) {
            return Err(format!(
                "{} does not support the {} format",
                inputs.platform, format
            ));
        }
        inputs.set_format(format);
    }
    if let Some(aspect) = args.aspect {
        inputs.aspect_ratio = aspect.into();
    }
    if let Some(parts) = args.parts {
        inputs.set_part_count(parts);
    }
    if let Some(tone) = args.tone {
        inputs.tone = tone.into();
    }
    if let Some(goal) = args.goal {
        inputs.goal = goal.into();
    }
    if let Some(watermark) = &args.watermark {
        inputs.watermark = Some(watermark.clone());
    }
    if let Some(id) = &args.playbook {
        if !inputs.set_playbook(id) {
            return Err(format!(
                "Unknown playbook '{}'. Run 'viralflow playbooks' to list them.",
                id
            ));
        }
    }
    for (key, value) in &args.vars {
        inputs.set_playbook_input(key, value);
    }
    if let Some(topic) = &args.topic {
        inputs.set_playbook_input("topic", topic);
    }
    Ok(inputs)
}

/// Generate content, print it and optionally save and export it.
pub fn run_generate(config: &Config, args: GenerateArgs) -> Result<(), String> {
    let inputs = build_inputs(config, &args)?;
    let mut controller = controller(config)?;
    *controller.inputs_mut() = inputs;

    eprintln!("Generating {}...", controller.inputs().format);
    runtime()?.block_on(controller.generate());
    if let Some(message) = controller.error() {
        return Err(message.to_string());
    }

    if let Some(content) = controller.content() {
        print!("{}", display::render_content(content));
    }

    if let Some(path) = &args.save {
        if let Some(session) = controller.session() {
            session.save(path).map_err(|e| e.to_string())?;
            eprintln!("Saved session to {}", path.display());
        }
    }

    if let Some(kind) = args.export {
        let dir = output_dir(config, args.out);
        export_current(&mut controller, kind, &dir)?;
    }
    Ok(())
}

fn export_current(
    controller: &mut AppController,
    kind: ExportFormat,
    dir: &Path,
) -> Result<(), String> {
    let kind = ExportKind::from(kind);
    let artifact = controller
        .export(kind)
        .map_err(|e| e.user_message(kind))?;
    let path = artifact.write_to(dir).map_err(|e| e.user_message(kind))?;
    println!("Saved {}", path.display());
    Ok(())
}

/// Analyse a published post and print the report.
pub fn run_analyze(config: &Config, url: String) -> Result<(), String> {
    let mut controller = controller(config)?;
    controller.set_mode(AppMode::Analyze);
    controller.set_post_url(url);

    eprintln!("Analyzing {}...", controller.post_url());
    runtime()?.block_on(controller.analyze());
    if let Some(message) = controller.error() {
        return Err(message.to_string());
    }
    if let Some(analysis) = controller.analysis() {
        print!("{}", display::render_analysis(analysis));
    }
    Ok(())
}

/// A/B-test a saved carousel's hook, optionally adopting one alternative.
pub fn run_optimize(config: &Config, session_path: PathBuf, select: Option<usize>) -> Result<(), String> {
    let mut controller = controller(config)?;
    controller.load_session(load_session(&session_path)?);

    if controller.content().and_then(|c| c.parts()).is_none() {
        return Err("Only carousel content has a hook to optimize.".to_string());
    }

    eprintln!("Generating hook alternatives...");
    runtime()?.block_on(controller.start_optimization());
    if let Some(message) = controller.error() {
        return Err(message.to_string());
    }
    if let Some(parts) = controller.optimized() {
        print!("{}", display::render_optimized(parts));
    }

    if let Some(index) = select {
        if !controller.select_optimized(index) {
            return Err(format!("No alternative at index {}", index));
        }
        if let Some(session) = controller.session() {
            session.save(&session_path).map_err(|e| e.to_string())?;
        }
        println!("Replaced hook with alternative {} in {}", index, session_path.display());
    }
    Ok(())
}

/// Generate a video from a saved script, printing status while the job runs.
pub fn run_video(
    config: &Config,
    session_path: PathBuf,
    timeout: Option<u64>,
    reuse: bool,
    out: Option<PathBuf>,
) -> Result<(), String> {
    let mut controller = controller(config)?;
    if let Some(secs) = timeout {
        controller = controller.with_poll_policy(
            config
                .poll_policy()
                .with_timeout(Some(Duration::from_secs(secs))),
        );
    }
    controller.load_session(load_session(&session_path)?);
    let Some(script) = controller.content().and_then(|c| c.script()) else {
        return Err("The session has no video script.".to_string());
    };

    if reuse {
        let cached = VideoCache::with_default_dir()
            .map_err(|e| e.to_string())
            .map(|cache| cached_video(&cache, script));
        match cached {
            Ok(Some(bytes)) => return save_video(config, controller.inputs(), out, &bytes),
            Ok(None) => log::info!("No cached video for this script, starting a new job"),
            Err(e) => log::warn!("Video cache unavailable: {}", e),
        }
    }

    let cancel = CancelHandle::new();
    let handler_cancel = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nCancelling...");
        handler_cancel.cancel();
    })
    .map_err(|e| format!("Failed to set Ctrl-C handler: {}", e))?;

    let slot = controller.video_status_slot();
    runtime()?.block_on(async {
        let watcher = tokio::spawn(async move {
            let mut last = String::new();
            loop {
                let status = read_status(&slot);
                if !status.is_empty() && status != last {
                    eprintln!("{}", status);
                }
                last = status;
                tokio::time::sleep(STATUS_REFRESH).await;
            }
        });
        controller.generate_video_with_cancel(cancel).await;
        watcher.abort();
    });

    if let Some(message) = controller.error() {
        return Err(message.to_string());
    }
    let video = controller
        .video()
        .ok_or_else(|| "No video was produced.".to_string())?;
    save_video(config, controller.inputs(), out, &video.bytes)
}

/// Bytes of a previously downloaded video for `script`, if the cache has a readable one.
fn cached_video(cache: &VideoCache, script: &str) -> Option<Vec<u8>> {
    let path = cache.get(&build_video_prompt(script))?;
    match std::fs::read(&path) {
        Ok(bytes) => {
            log::info!("Using cached video: {}", path.display());
            Some(bytes)
        }
        Err(e) => {
            log::warn!("Ignoring unreadable cached video {}: {}", path.display(), e);
            None
        }
    }
}

/// Write the video to `out`, or to `<topic>.mp4` in the export directory.
fn save_video(
    config: &Config,
    inputs: &UserInputs,
    out: Option<PathBuf>,
    bytes: &[u8],
) -> Result<(), String> {
    let path = out.unwrap_or_else(|| {
        config
            .export
            .output_dir
            .join(format!("{}.mp4", file_stem(inputs)))
    });
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    std::fs::write(&path, bytes).map_err(|e| format!("{}: {}", path.display(), e))?;
    println!("Saved {}", path.display());
    Ok(())
}

/// Export a saved carousel, or a directory of pre-rendered frames.
pub fn run_export(
    config: &Config,
    session_path: PathBuf,
    kind: ExportFormat,
    frames: Option<PathBuf>,
    part: Option<usize>,
    out: Option<PathBuf>,
) -> Result<(), String> {
    let mut controller = controller(config)?;
    controller.load_session(load_session(&session_path)?);
    let dir = output_dir(config, out);
    let position = part.map(|p| p.saturating_sub(1));

    let Some(frames_dir) = frames else {
        if let Some(position) = position {
            if !controller.go_to_part(position) {
                return Err(format!("No slide {}", position + 1));
            }
        }
        return export_current(&mut controller, kind, &dir);
    };

    let mut stage = Stage::load_frames(&frames_dir, controller.inputs().aspect_ratio)
        .map_err(|e| format!("{}: {}", frames_dir.display(), e))?;
    if let Some(position) = position {
        if !stage.set_active(position) {
            return Err(format!("No frame {}", position + 1));
        }
    }
    let kind = ExportKind::from(kind);
    let artifact = controller
        .export_stage(kind, &stage)
        .map_err(|e| e.user_message(kind))?;
    let path = artifact.write_to(&dir).map_err(|e| e.user_message(kind))?;
    println!("Saved {}", path.display());
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(config: &Config, path: Option<&Path>, action: ConfigAction) -> Result<(), String> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!();
            print!("{}", config.to_toml().map_err(|e| e.to_string())?);
            println!();
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(format!(
                    "Config file already exists: {}\nUse 'viralflow config show' to view current settings.",
                    config_path.display()
                ));
            }

            // Create parent directories if needed
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Error creating config directory: {}", e))?;
            }

            std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)
                .map_err(|e| format!("Error writing config file: {}", e))?;
            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Command};
    use crate::content::{AspectRatio, Format, Platform};
    use clap::Parser;

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let mut full = vec!["viralflow", "generate"];
        full.extend_from_slice(argv);
        match Args::parse_from(full).command {
            Command::Generate(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cached_video_only_for_matching_script() {
        let temp = tempfile::TempDir::new().unwrap();
        let cache = VideoCache::new(temp.path().to_path_buf());
        assert!(cached_video(&cache, "Hook. Body.").is_none());

        cache.store(&build_video_prompt("Hook. Body."), b"VIDEO").unwrap();
        assert_eq!(cached_video(&cache, "Hook. Body.").unwrap(), b"VIDEO");
        assert!(cached_video(&cache, "Another script.").is_none());
    }

    #[test]
    fn test_save_video_defaults_to_topic_name() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.export.output_dir = temp.path().join("videos");

        save_video(&config, &UserInputs::default(), None, b"VIDEO").unwrap();
        let saved = temp.path().join("videos").join("Why_most_diets_fail.mp4");
        assert_eq!(std::fs::read(saved).unwrap(), b"VIDEO");
    }

    #[test]
    fn test_build_inputs_defaults_from_config() {
        let mut config = Config::default();
        config.branding.watermark = Some("@me".to_string());
        let inputs = build_inputs(&config, &generate_args(&[])).unwrap();
        assert_eq!(inputs.watermark(), Some("@me"));
        assert_eq!(inputs.format, Format::Carousel);
    }

    #[test]
    fn test_build_inputs_format_sets_aspect_unless_overridden() {
        let config = Config::default();
        let inputs = build_inputs(&config, &generate_args(&["--format", "story"])).unwrap();
        assert_eq!(inputs.aspect_ratio, AspectRatio::Tall);

        let inputs = build_inputs(
            &config,
            &generate_args(&["--format", "story", "--aspect", "square"]),
        )
        .unwrap();
        assert_eq!(inputs.aspect_ratio, AspectRatio::Square);
    }

    #[test]
    fn test_build_inputs_rejects_unsupported_format() {
        let config = Config::default();
        let err = build_inputs(
            &config,
            &generate_args(&["--platform", "twitter", "--format", "carousel"]),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_build_inputs_playbook_and_vars() {
        let config = Config::default();
        let id = PLAYBOOKS[1].id;
        let key = PLAYBOOKS[1].inputs[0].id;
        let var = format!("{}=baking", key);
        let inputs = build_inputs(
            &config,
            &generate_args(&["--platform", "linkedin", "--playbook", id, "--var", var.as_str(), "--parts", "40"]),
        )
        .unwrap();
        assert_eq!(inputs.platform, Platform::LinkedIn);
        assert_eq!(inputs.playbook_id, id);
        assert_eq!(inputs.input(key), Some("baking"));
        assert_eq!(inputs.part_count, crate::content::MAX_PART_COUNT);
    }

    #[test]
    fn test_build_inputs_unknown_playbook() {
        let config = Config::default();
        assert!(build_inputs(&config, &generate_args(&["--playbook", "nope"])).is_err());
    }

    #[test]
    fn test_config_init_writes_template_once() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("sub").join("config.toml");
        let config = Config::default();

        handle_config_action(&config, Some(path.as_path()), ConfigAction::Init).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG_TEMPLATE);
        assert!(handle_config_action(&config, Some(path.as_path()), ConfigAction::Init).is_err());
    }
}
