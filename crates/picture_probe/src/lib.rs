use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

use actor_pictures::{
    load_picture_config, preload_names, preload_pictures, ActorId, Alignment, AnimationProfile,
    AssetLoader, ConfigEncoding, LoadedPictureConfig, PictureDirectory, PictureImage,
    PictureResolver, PreloadScope, StateId,
};

pub const DEFAULT_FRAME_COUNT: u64 = 350;

#[derive(Debug, Clone, Default)]
pub struct CommonOptions {
    pub config_path: PathBuf,
    pub encoding: ConfigEncoding,
    pub pictures_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolveArgs {
    pub actor_id: ActorId,
    pub hp_percent: f32,
    pub states: Vec<StateId>,
    pub costume_index: usize,
    pub width: u32,
    pub height: u32,
    pub alignment: Alignment,
}

impl ResolveArgs {
    pub fn new(actor_id: ActorId) -> Self {
        Self {
            actor_id,
            hp_percent: 100.0,
            states: Vec::new(),
            costume_index: 0,
            width: 0,
            height: 0,
            alignment: Alignment::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    Check,
    Resolve(ResolveArgs),
    Frames { picture: String, frames: u64 },
    Preload { scope: PreloadScope, party: Vec<ActorId> },
}

pub fn parse_id_list(raw: &str) -> Result<Vec<u32>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<u32>()
                .map_err(|_| format!("invalid id '{entry}' (expected u32)"))
        })
        .collect()
}

/// Run-length view of a frame sequence: `(frame, hold)` pairs.
pub fn frame_runs(profile: &AnimationProfile, frames: u64) -> Vec<(usize, u64)> {
    let mut runs = Vec::<(usize, u64)>::new();
    for elapsed in 0..frames {
        let frame = actor_pictures::frame_at(profile, elapsed);
        match runs.last_mut() {
            Some((last, hold)) if *last == frame => *hold += 1,
            _ => runs.push((frame, 1)),
        }
    }
    runs
}

pub fn run<W: Write>(kind: CommandKind, opts: CommonOptions, stdout: &mut W) -> Result<(), String> {
    let loaded = load_picture_config(&opts.config_path, opts.encoding)
        .map_err(|error| format!("failed to load '{}': {error}", opts.config_path.display()))?;

    match kind {
        CommandKind::Check => run_check(&loaded, stdout),
        CommandKind::Resolve(args) => run_resolve(&loaded, &args, &opts, stdout),
        CommandKind::Frames { picture, frames } => run_frames(&loaded, &picture, frames, stdout),
        CommandKind::Preload { scope, party } => {
            run_preload(&loaded, scope, &party, &opts, stdout)
        }
    }
}

fn run_check<W: Write>(loaded: &LoadedPictureConfig, stdout: &mut W) -> Result<(), String> {
    let registry = &loaded.registry;
    emit(
        stdout,
        format!(
            "actors={} calibrations={} animations={} issues={} preload_all_at_every_scene={}",
            registry.actor_count(),
            registry.calibration_count(),
            registry.animation_count(),
            loaded.issues.len(),
            loaded.settings.preload_all_at_every_scene
        ),
    )?;
    for issue in &loaded.issues {
        emit(stdout, format!("issue: {issue}"))?;
    }
    if loaded.issues.iter().any(|issue| issue.drops_entry()) {
        return Err("configuration has entries that were dropped".to_string());
    }
    Ok(())
}

fn run_resolve<W: Write>(
    loaded: &LoadedPictureConfig,
    args: &ResolveArgs,
    opts: &CommonOptions,
    stdout: &mut W,
) -> Result<(), String> {
    let registry = &loaded.registry;
    let active_states = args.states.iter().copied().collect::<HashSet<_>>();
    let resolved = PictureResolver::new(registry).resolve(
        args.actor_id,
        &active_states,
        args.hp_percent,
        args.costume_index,
    );
    let Some(picture) = resolved else {
        return emit(stdout, "picture=<none>".to_string());
    };
    emit(
        stdout,
        format!("picture={} tier={:?}", picture.name, picture.tier),
    )?;

    let Some(pictures_dir) = &opts.pictures_dir else {
        return Ok(());
    };
    let mut directory = PictureDirectory::new(pictures_dir);
    let image = directory.load_image(picture.name).ok_or_else(|| {
        format!(
            "picture '{}' could not be read from {}",
            picture.name,
            directory.picture_path(picture.name).display()
        )
    })?;
    let size = image.size();
    let source =
        registry.display_geometry(picture.name, size, args.width, args.height, args.alignment);
    emit(
        stdout,
        format!(
            "image={}x{} frame_width={} source x={} y={} width={} height={}",
            size.width,
            size.height,
            registry.frame_width(picture.name, size),
            source.x,
            source.y,
            source.width,
            source.height
        ),
    )
}

fn run_frames<W: Write>(
    loaded: &LoadedPictureConfig,
    picture: &str,
    frames: u64,
    stdout: &mut W,
) -> Result<(), String> {
    let registry = &loaded.registry;
    let profile = registry.animation_profile(picture);
    emit(
        stdout,
        format!(
            "picture={picture} animated={} patterns={} repeats={} loop_frames={}",
            registry.has_animation(picture),
            profile.pattern_count(),
            profile.repeat_count(),
            profile.loop_frames()
        ),
    )?;
    for (frame, hold) in frame_runs(profile, frames) {
        emit(stdout, format!("frame={frame} hold={hold}"))?;
    }
    Ok(())
}

fn run_preload<W: Write>(
    loaded: &LoadedPictureConfig,
    scope: PreloadScope,
    party: &[ActorId],
    opts: &CommonOptions,
    stdout: &mut W,
) -> Result<(), String> {
    let registry = &loaded.registry;
    match &opts.pictures_dir {
        Some(pictures_dir) => {
            let mut directory = PictureDirectory::new(pictures_dir);
            let requested = preload_pictures(registry, scope, party, &mut directory);
            emit(
                stdout,
                format!(
                    "scope={scope} requested={requested} cached={}",
                    directory.cached_count()
                ),
            )
        }
        None => {
            for name in preload_names(registry, scope, party) {
                emit(stdout, name.to_string())?;
            }
            Ok(())
        }
    }
}

fn emit<W: Write>(stdout: &mut W, line: String) -> Result<(), String> {
    writeln!(stdout, "{line}").map_err(|error| format!("failed to write output: {error}"))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    use super::*;

    const CONFIG: &str = r#"{
        "actorPictures": [
            {
                "actorId": 1,
                "normalPictures": ["hero", "hero_alt"],
                "statePictures": [{ "stateId": 4, "pictures": ["hero_poison"] }],
                "damagePictures": [
                    { "damageRate": 60, "pictures": ["hero_tired"] },
                    { "damageRate": 30, "pictures": ["hero_hurt"] }
                ]
            },
            { "actorId": 2, "normalPictures": ["rival"] }
        ],
        "pictureCalibrations": [{ "pictureName": "hero", "centerX": 70, "offsetY": 10 }],
        "animationPictures": [{ "pictureName": "hero" }]
    }"#;

    fn write_config(dir: &Path, raw: &str) -> PathBuf {
        let path = dir.join("pictures.json");
        fs::write(&path, raw).expect("write config");
        path
    }

    fn options(config_path: PathBuf) -> CommonOptions {
        CommonOptions {
            config_path,
            ..CommonOptions::default()
        }
    }

    fn run_to_string(kind: CommandKind, opts: CommonOptions) -> Result<String, String> {
        let mut out = Vec::new();
        run(kind, opts, &mut out)?;
        Ok(String::from_utf8(out).expect("utf8"))
    }

    #[test]
    fn parse_id_list_skips_blanks_and_rejects_garbage() {
        assert_eq!(parse_id_list("1, 4,,7"), Ok(vec![1, 4, 7]));
        assert_eq!(parse_id_list(""), Ok(vec![]));
        assert!(parse_id_list("1,x").is_err());
    }

    #[test]
    fn frame_runs_compress_the_default_blink() {
        let profile = AnimationProfile::new(vec![1, 2, 2], vec![30, 24, 10, 6]).expect("profile");
        let runs = frame_runs(&profile, 150);
        assert_eq!(runs, vec![(0, 30), (1, 60), (2, 60)]);
    }

    #[test]
    fn check_reports_summary() {
        let temp = TempDir::new().expect("temp");
        let path = write_config(temp.path(), CONFIG);
        let out = run_to_string(CommandKind::Check, options(path)).expect("check");
        assert_eq!(
            out,
            "actors=2 calibrations=1 animations=1 issues=0 preload_all_at_every_scene=true\n"
        );
    }

    #[test]
    fn check_fails_when_entries_are_dropped() {
        let temp = TempDir::new().expect("temp");
        let path = write_config(
            temp.path(),
            r#"{"actorPictures": [{"actorId": 1, "damagePictures": [{"damageRate": 150}]}]}"#,
        );
        let mut out = Vec::new();
        let error = run(CommandKind::Check, options(path), &mut out).expect_err("error");
        assert!(error.contains("dropped"));
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.contains("issue: InvalidValue"), "{out}");
    }

    #[test]
    fn resolve_prints_picture_and_tier() {
        let temp = TempDir::new().expect("temp");
        let path = write_config(temp.path(), CONFIG);

        let mut args = ResolveArgs::new(ActorId(1));
        args.hp_percent = 55.0;
        let out = run_to_string(CommandKind::Resolve(args.clone()), options(path.clone()))
            .expect("resolve");
        assert_eq!(out, "picture=hero_tired tier=Damage\n");

        args.states = vec![StateId(4)];
        let out = run_to_string(CommandKind::Resolve(args), options(path.clone()))
            .expect("resolve");
        assert_eq!(out, "picture=hero_poison tier=State\n");

        let out = run_to_string(CommandKind::Resolve(ResolveArgs::new(ActorId(9))), options(path))
            .expect("resolve");
        assert_eq!(out, "picture=<none>\n");
    }

    #[test]
    fn resolve_with_pictures_dir_prints_source_rect() {
        let temp = TempDir::new().expect("temp");
        let path = write_config(temp.path(), CONFIG);
        let pictures = temp.path().join("pictures");
        fs::create_dir_all(&pictures).expect("mkdir");
        RgbaImage::from_pixel(300, 200, Rgba([0, 0, 0, 0]))
            .save(pictures.join("hero.png"))
            .expect("save");

        let mut args = ResolveArgs::new(ActorId(1));
        args.width = 60;
        args.alignment = Alignment {
            center: true,
            vertical_offset: true,
        };
        let opts = CommonOptions {
            pictures_dir: Some(pictures),
            ..options(path)
        };
        let out = run_to_string(CommandKind::Resolve(args), opts).expect("resolve");
        assert_eq!(
            out,
            "picture=hero tier=Normal\nimage=300x200 frame_width=100 source x=40 y=10 width=60 height=200\n"
        );
    }

    #[test]
    fn frames_lists_holds_for_static_pictures() {
        let temp = TempDir::new().expect("temp");
        let path = write_config(temp.path(), CONFIG);
        let out = run_to_string(
            CommandKind::Frames {
                picture: "rival".to_string(),
                frames: 10,
            },
            options(path),
        )
        .expect("frames");
        assert_eq!(
            out,
            "picture=rival animated=false patterns=1 repeats=1 loop_frames=1\nframe=0 hold=10\n"
        );
    }

    #[test]
    fn preload_lists_party_names() {
        let temp = TempDir::new().expect("temp");
        let path = write_config(temp.path(), CONFIG);
        let out = run_to_string(
            CommandKind::Preload {
                scope: PreloadScope::Party,
                party: vec![ActorId(2)],
            },
            options(path.clone()),
        )
        .expect("preload");
        assert_eq!(out, "rival\n");

        let out = run_to_string(
            CommandKind::Preload {
                scope: PreloadScope::All,
                party: Vec::new(),
            },
            options(path),
        )
        .expect("preload");
        assert_eq!(out.lines().count(), 6);
    }

    #[test]
    fn missing_config_is_reported() {
        let temp = TempDir::new().expect("temp");
        let error = run_to_string(CommandKind::Check, options(temp.path().join("nope.json")))
            .expect_err("error");
        assert!(error.contains("failed to load"));
    }
}
