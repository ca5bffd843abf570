//! Subcommand handlers

use anyhow::Context;
use clap::ArgMatches;
use gallery_changeset::{Changeset, DirectorySnapshot, Manifest, IMAGE_EXTENSION};
use gallery_core::{display_name, project, GalleryConfig, ProgressTracker, Session, SortMode};
use gallery_version::VersionTarget;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Config file if given, else defaults; `--source` overrides the location
pub(crate) fn load_config(
    path: Option<&PathBuf>,
    source: Option<&String>,
) -> anyhow::Result<GalleryConfig> {
    let mut config = match path {
        Some(path) => GalleryConfig::load(path)?,
        None => GalleryConfig::default(),
    };
    if let Some(location) = source {
        config = config.with_location(location.as_str());
    }
    config.validate()?;
    Ok(config)
}

/// Open a session and apply the view flags shared by list, export and download
async fn open_view(config: &GalleryConfig, args: &ArgMatches) -> anyhow::Result<Session> {
    let target: VersionTarget = match args.get_one::<String>("version") {
        Some(s) => s.parse().context("invalid --version")?,
        None => config.gallery.target.clone(),
    };
    let sort: SortMode = match args.get_one::<String>("sort") {
        Some(s) => s.parse().map_err(anyhow::Error::msg)?,
        None => SortMode::default(),
    };
    let show_removed = config.gallery.show_removed || args.get_flag("show-removed");

    let config = config
        .clone()
        .with_target(target)
        .with_show_removed(show_removed);
    let session = Session::open(&config).await?;
    if session.is_degraded() {
        tracing::warn!("catalog unavailable, using built-in version list");
    }
    for skipped in session.reconstruction().skipped() {
        tracing::warn!(version = %skipped.version, reason = %skipped.reason, "changeset skipped");
    }
    if let Some(search) = args.get_one::<String>("search") {
        session.set_search(search.as_str());
    }
    session.set_sort(sort);
    Ok(session)
}

pub(crate) async fn versions(config: &GalleryConfig) -> anyhow::Result<()> {
    let session = Session::open(config).await?;
    let catalog = session.catalog();
    let mut out = std::io::stdout().lock();
    for version in catalog.versions() {
        let mut tags = Vec::new();
        if version == catalog.base() {
            tags.push("base");
        }
        if version == catalog.latest() {
            tags.push("latest");
        }
        if tags.is_empty() {
            writeln!(out, "{version}")?;
        } else {
            writeln!(out, "{version} ({})", tags.join(", "))?;
        }
    }
    Ok(())
}

pub(crate) async fn list(config: &GalleryConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let session = open_view(config, args).await?;
    let view = session.reconstruction();
    let names = project(&view, &session.search(), session.sort());

    let mut out = std::io::stdout().lock();
    if args.get_flag("json") {
        let items: Vec<_> = names
            .iter()
            .filter_map(|name| view.get(name))
            .map(|record| {
                serde_json::json!({
                    "filename": record.filename(),
                    "displayName": display_name(record.filename()),
                    "version": record.version().to_string(),
                    "removed": view.is_removed(record.filename()),
                })
            })
            .collect();
        serde_json::to_writer_pretty(&mut out, &items)?;
        writeln!(out)?;
    } else {
        for name in &names {
            let Some(record) = view.get(name) else { continue };
            let marker = if view.is_removed(name) { " [removed]" } else { "" };
            writeln!(out, "{name}\t{}\t{}{marker}", display_name(name), record.version())?;
        }
    }
    tracing::info!(version = %view.target(), items = names.len(), "listed");
    Ok(())
}

pub(crate) async fn export(config: &GalleryConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let session = open_view(config, args).await?;
    if let Some(selected) = args.get_many::<String>("select") {
        for name in selected {
            session.select(name)?;
        }
    }

    let mut tracker = ProgressTracker::new(|p| {
        eprint!("\r{:?} {:>3}%", p.phase, p.percent);
        if p.percent == 100 {
            eprintln!();
        }
    });
    let export = session.export(&mut tracker).await?;
    for skipped in export.archive.skipped() {
        tracing::warn!(item = %skipped.filename, reason = %skipped.reason, "left out of archive");
    }

    let out_dir = args
        .get_one::<PathBuf>("out")
        .map_or_else(|| PathBuf::from("."), Clone::clone);
    let path = out_dir.join(export.file_name());
    tokio::fs::write(&path, export.archive.bytes())
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        included = export.archive.included().len(),
        skipped = export.archive.skipped().len(),
        "archive written"
    );
    Ok(())
}

pub(crate) async fn download(config: &GalleryConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let name = args
        .get_one::<String>("name")
        .context("missing image name")?;
    let session = open_view(config, args).await?;
    let blob = session.download(name).await?;

    let out_dir = args
        .get_one::<PathBuf>("out")
        .map_or_else(|| PathBuf::from("."), Clone::clone);
    let path = output_path(&out_dir, name)?;
    tokio::fs::write(&path, blob.bytes())
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = blob.len(), "image written");
    Ok(())
}

pub(crate) async fn manifest(args: &ArgMatches) -> anyhow::Result<()> {
    let dir = args.get_one::<PathBuf>("dir").context("missing directory")?;
    let manifest = manifest_for(dir).await?;
    tracing::info!(images = manifest.images.len(), "manifest generated");
    write_output(args.get_one::<PathBuf>("out"), &manifest.to_json_pretty()?).await
}

pub(crate) async fn diff(args: &ArgMatches) -> anyhow::Result<()> {
    let old = args.get_one::<PathBuf>("old").context("missing old directory")?;
    let new = args.get_one::<PathBuf>("new").context("missing new directory")?;
    let changeset = changeset_between(old, new).await?;
    tracing::info!(
        added = changeset.added.len(),
        modified = changeset.modified.len(),
        removed = changeset.removed.len(),
        "changeset generated"
    );
    write_output(args.get_one::<PathBuf>("out"), &changeset.to_json_pretty()?).await
}

/// `out_dir/name`, provided `name` is a single plain path segment
fn output_path(out_dir: &Path, name: &str) -> anyhow::Result<PathBuf> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(file)), None) => Ok(out_dir.join(file)),
        _ => anyhow::bail!("refusing to write '{name}': not a plain file name"),
    }
}

async fn manifest_for(dir: &Path) -> anyhow::Result<Manifest> {
    let snapshot = DirectorySnapshot::scan(dir, IMAGE_EXTENSION).await?;
    Ok(snapshot.manifest())
}

async fn changeset_between(old: &Path, new: &Path) -> anyhow::Result<Changeset> {
    let (old, new) = tokio::try_join!(
        DirectorySnapshot::scan(old, IMAGE_EXTENSION),
        DirectorySnapshot::scan(new, IMAGE_EXTENSION),
    )?;
    Ok(old.diff(&new))
}

async fn write_output(out: Option<&PathBuf>, text: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => tokio::fs::write(path, format!("{text}\n"))
            .await
            .with_context(|| format!("writing {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}")?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_images(dir: &Path, images: &[(&str, &[u8])]) {
        for (name, bytes) in images {
            fs::write(dir.join(name), bytes).unwrap();
        }
    }

    #[tokio::test]
    async fn manifest_lists_png_files_only() {
        let dir = tempfile::tempdir().unwrap();
        write_images(dir.path(), &[("b.png", b"b"), ("a.png", b"a"), ("notes.txt", b"x")]);

        let manifest = manifest_for(dir.path()).await.unwrap();
        assert_eq!(manifest.images, vec!["a.png", "b.png"]);
        assert_eq!(manifest.total_count, Some(2));
        assert!(manifest.created_at.is_some());
    }

    #[tokio::test]
    async fn diff_classifies_changes() {
        let old = tempfile::tempdir().unwrap();
        let new = tempfile::tempdir().unwrap();
        write_images(old.path(), &[("apple.png", b"1"), ("stone.png", b"1"), ("dirt.png", b"1")]);
        write_images(new.path(), &[("apple.png", b"1"), ("stone.png", b"2"), ("copper.png", b"1")]);

        let changeset = changeset_between(old.path(), new.path()).await.unwrap();
        assert_eq!(changeset.added, vec!["copper.png"]);
        assert_eq!(changeset.modified, vec!["stone.png"]);
        assert_eq!(changeset.removed, vec!["dirt.png"]);
    }

    #[tokio::test]
    async fn output_file_is_newline_terminated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.json");
        write_output(Some(&path), "{}").await.unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
    }

    #[test]
    fn output_path_stays_in_out_dir() {
        let out = Path::new("/tmp/sprites");
        assert_eq!(
            output_path(out, "apple.png").unwrap(),
            PathBuf::from("/tmp/sprites/apple.png")
        );
        for name in ["/abs.png", "../up.png", "nested/apple.png", "", ".", ".."] {
            assert!(output_path(out, name).is_err(), "{name:?} should be refused");
        }
    }

    #[test]
    fn source_flag_overrides_location() {
        let location = "https://mirror.example.com/sprites".to_string();
        let config = load_config(None, Some(&location)).unwrap();
        assert_eq!(config.source.location, location);
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery.toml");
        fs::write(&path, "[gallery]\npage_size = 25\n").unwrap();
        let config = load_config(Some(&path), None).unwrap();
        assert_eq!(config.gallery.page_size, 25);
    }
}
