//! Subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use filmgrade_core::analysis::stats::{AnalysisOptions, ImageStats};
use filmgrade_core::grading::auto_balance::{MatchOptions, auto_params, reference_params};
use filmgrade_core::image::PixelBuffer;
use filmgrade_core::transform::params::AdaptiveParams;
use filmgrade_core::{
    FilmPreset, FilmSettings, FilmType, GradingParams, Lut3D, ReferenceProfile, RenderContext,
    RenderOptions,
};

use crate::config::CliConfig;
use crate::image_loader::{load_image, save_image};
use crate::{AnalyzeArgs, GradeArgs, IdentityLutArgs, ProfileArgs};

fn parse_film(id: &str) -> Result<FilmType> {
    FilmType::from_id(id).ok_or_else(|| anyhow!("unknown film stock '{id}' (see `filmgrade films`)"))
}

fn load_lut(path: &Path) -> Result<Arc<Lut3D>> {
    let lut = Lut3D::load_cube(path).with_context(|| format!("failed to load LUT {}", path.display()))?;
    Ok(Arc::new(lut))
}

fn analyze_buffer(buffer: &PixelBuffer, stride: usize) -> ImageStats {
    ImageStats::analyze_with(
        buffer,
        AnalysisOptions {
            stride,
            parallel: true,
        },
    )
}

pub fn grade(args: GradeArgs, config: &CliConfig) -> Result<()> {
    let source = load_image(&args.input).with_context(|| format!("failed to load {}", args.input.display()))?;
    let stride = args.stride.unwrap_or(config.stats_stride).max(1);

    let mut params = match &args.params {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            GradingParams::from_json(&json).with_context(|| format!("invalid parameters in {}", path.display()))?
        }
        None => GradingParams::default(),
    };

    if let Some(id) = &args.film {
        let film = parse_film(id)?;
        params.select_film(film);
        params.apply_film_defaults();
    }
    if let Some(id) = &args.preset {
        let preset = FilmPreset::from_id(id).ok_or_else(|| anyhow!("unknown preset '{id}'"))?;
        preset.apply(&mut params);
    }
    if args.auto {
        auto_params(&analyze_buffer(&source, stride)).apply_to(&mut params);
    }
    if let Some(path) = &args.reference {
        let profile = ReferenceProfile::load(path).with_context(|| format!("failed to load profile {}", path.display()))?;
        let src_stats = analyze_buffer(&source, stride);
        let options = MatchOptions {
            strength: args.match_strength.clamp(0.0, 100.0) / 100.0,
            ..MatchOptions::default()
        };
        reference_params(&src_stats, &profile.stats, options).apply_to(&mut params);
        if let Some(settings) = &profile.film_settings {
            settings.apply_to(&mut params);
        }
        if args.adaptive {
            params.adaptive = AdaptiveParams::from_stats(&src_stats, &profile.stats, args.match_strength);
        }
    }
    if let Some(strength) = args.lut_strength {
        params.lut_strength = strength;
    }

    let mut ctx = RenderContext::new(RenderOptions {
        log_headroom: args.log_headroom,
        grain_seed: args.seed,
        parallel: true,
    });
    if let Some(path) = &args.lut {
        ctx.set_creative_lut(Some(load_lut(path)?));
    }
    if let Some(path) = &args.input_lut {
        ctx.set_input_lut(Some(load_lut(path)?));
    }
    if let Some(path) = &args.output_lut {
        ctx.set_output_lut(Some(load_lut(path)?));
    }

    let graded = ctx.render(&source, &params).context("render failed")?;
    save_image(&args.output, &graded).with_context(|| format!("failed to save {}", args.output.display()))?;
    Ok(())
}

pub fn analyze(args: AnalyzeArgs, config: &CliConfig) -> Result<()> {
    let source = load_image(&args.input).with_context(|| format!("failed to load {}", args.input.display()))?;
    let stats = analyze_buffer(&source, args.stride.unwrap_or(config.stats_stride).max(1));
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

pub fn profile(args: ProfileArgs, config: &CliConfig) -> Result<()> {
    let source = load_image(&args.input).with_context(|| format!("failed to load {}", args.input.display()))?;
    let stats = analyze_buffer(&source, args.stride.unwrap_or(config.stats_stride).max(1));

    let mut profile = ReferenceProfile::new(args.name, stats);
    if let Some(description) = args.description {
        profile = profile.with_description(description);
    }
    if let Some(id) = &args.film {
        profile = profile.with_film_settings(FilmSettings::from_film(parse_film(id)?));
    }
    if args.thumbnail {
        profile = profile.with_thumbnail(&source);
    }
    profile
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    Ok(())
}

pub fn identity_lut(args: IdentityLutArgs) -> Result<()> {
    let lut = Lut3D::identity(args.size)
        .context("invalid LUT size")?
        .with_title(format!("Identity {}", args.size));
    lut.save_cube(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    tracing::info!(path = %args.output.display(), size = args.size, "wrote identity LUT");
    Ok(())
}

pub fn films() {
    println!("Film stocks:");
    for film in FilmType::ALL {
        let bw = film.profile().is_some_and(|p| p.black_and_white);
        println!("  {:<20} {}{}", film.id(), film.label(), if bw { " (B&W)" } else { "" });
    }
    println!();
    println!("Presets:");
    for preset in FilmPreset::ALL {
        println!("  {:<20} {}: {}", preset.id(), preset.name(), preset.description());
    }
}
