use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use strata_core::codec::{self, Canvas};
use strata_core::config::Config;
use strata_core::editor::{DocumentController, SaveStatus};
use strata_core::emitter::{EmitterPreview, RecordingCanvas};
use strata_core::store::{ProjectStore, SqliteStore};
use strata_core::{Result, StrataError};
use strata_types::{Size, ViewKind};

#[derive(Debug)]
pub enum Command {
    List { json: bool },
    New { name: String },
    Export { project: String, view: ViewKind, out: Option<PathBuf> },
    Import { project: String, view: ViewKind, file: PathBuf },
    Sweep { project: String },
    Preview { project: String, view: ViewKind, seconds: f64, fps: u32 },
}

pub fn run(command: Command, db: Option<PathBuf>) -> Result<()> {
    let config = Config::load();
    let path = db.unwrap_or_else(SqliteStore::default_path);
    let store = SqliteStore::open(&path)?;

    match command {
        Command::List { json } => list(&store, json),
        Command::New { name } => {
            let meta = config.new_project_meta(uuid::Uuid::new_v4().to_string(), name);
            let id = meta.id.clone();
            let editor = DocumentController::create(store, meta, config.editor_settings());
            finish(editor.close())?;
            println!("{id}");
            Ok(())
        }
        Command::Export { project, view, out } => {
            let editor = DocumentController::open(store, &project, config.editor_settings())?;
            let canvas = Canvas::from_meta(&editor.document().meta);
            let text = codec::serialize_view(editor.view(view), &canvas)?;
            match out {
                Some(path) => std::fs::write(path, text)?,
                None => std::io::stdout().write_all(text.as_bytes())?,
            }
            Ok(())
        }
        Command::Import { project, view, file } => {
            let text = std::fs::read_to_string(&file)?;
            let parsed = codec::parse_view(&text, view)?;
            let layers = parsed.view.tree.len();
            let mut editor = DocumentController::open(store, &project, config.editor_settings())?;
            editor.replace_view(parsed.view);
            finish(editor.close())?;
            println!("imported {layers} layer(s) into {view}");
            Ok(())
        }
        Command::Sweep { project } => {
            let mut editor = DocumentController::open(store, &project, config.editor_settings())?;
            let deleted = editor.sweep_assets()?;
            for path in &deleted {
                println!("deleted {path}");
            }
            println!("{} asset(s) removed", deleted.len());
            Ok(())
        }
        Command::Preview { project, view, seconds, fps } => {
            let editor = DocumentController::open(store, &project, config.editor_settings())?;
            let meta = &editor.document().meta;
            let mut preview = EmitterPreview::for_view(
                editor.view(view),
                Size::new(meta.width, meta.height),
                meta.geometry_flipped,
                config.preview_settings(),
            );
            if preview.emitter_count() == 0 {
                println!("{view} has no emitter layers");
                return Ok(());
            }
            run_preview(&mut preview, seconds, fps);
            Ok(())
        }
    }
}

fn list(store: &SqliteStore, json: bool) -> Result<()> {
    let projects = store.list_projects()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }
    for meta in projects {
        let views: Vec<&str> = ViewKind::active_for(meta.gyro_enabled)
            .iter()
            .map(|k| k.as_str())
            .collect();
        println!(
            "{}\t{}\t{}x{}\t{}",
            meta.id,
            meta.name,
            meta.width,
            meta.height,
            views.join(",")
        );
    }
    Ok(())
}

fn run_preview(preview: &mut EmitterPreview, seconds: f64, fps: u32) {
    let frame = Duration::from_secs_f64(1.0 / f64::from(fps));
    let frames = (seconds * f64::from(fps)).round() as u64;
    let mut canvas = RecordingCanvas::default();
    for i in 1..=frames {
        preview.frame(frame);
        if i % u64::from(fps) == 0 || i == frames {
            canvas.clear();
            preview.draw(&mut canvas);
            println!(
                "t={:.2}s particles={} draws={}",
                i as f64 / f64::from(fps),
                preview.live_particles(),
                canvas.draws.len()
            );
        }
    }
}

fn finish(status: SaveStatus) -> Result<()> {
    match status {
        SaveStatus::Failed(message) => Err(StrataError::Store(message)),
        _ => Ok(()),
    }
}
