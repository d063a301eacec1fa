//! Photo upload CLI
//!
//! Uploads local photos into a remote album, or lists the user's albums.

use clap::{Arg, ArgAction, Command};
use photo_uploader::{
    authorize_url, collection, fetch_albums, has_app_permission, logging, AlbumId, ImageResizer,
    LogLevel, PhotoCollection, PostUploadAction, RestClient, Tag, UploadCallbacks,
    UploadPipeline, UploaderConfig, UPLOAD_PERMISSION,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_CONFIG: &str = "photo_upload.json";

fn cli() -> Command {
    Command::new("photo_upload")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Upload photos into an album")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Configuration file")
                .default_value(DEFAULT_CONFIG)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("upload")
                .about("Resize and upload photos")
                .arg(
                    Arg::new("files")
                        .help("Photos to upload, in order")
                        .required(true)
                        .num_args(1..),
                )
                .arg(
                    Arg::new("album")
                        .short('a')
                        .long("album")
                        .help("Album id (defaults to the last album used)"),
                )
                .arg(
                    Arg::new("caption")
                        .long("caption")
                        .help("Caption applied to every photo"),
                )
                .arg(
                    Arg::new("tag")
                        .long("tag")
                        .help("Text tag as TEXT@X,Y with X and Y in percent")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(Command::new("albums").about("List your albums"))
        .subcommand_required(true)
}

fn parse_tag(spec: &str) -> Result<Tag, String> {
    let (text, position) = spec
        .rsplit_once('@')
        .ok_or_else(|| format!("Tag '{}' must look like TEXT@X,Y", spec))?;
    let (x, y) = position
        .split_once(',')
        .ok_or_else(|| format!("Tag position '{}' must look like X,Y", position))?;
    let x: i64 = x.trim().parse().map_err(|_| format!("Invalid x in '{}'", spec))?;
    let y: i64 = y.trim().parse().map_err(|_| format!("Invalid y in '{}'", spec))?;
    Ok(Tag::text(text, x, y))
}

fn load_config(path: &Path, verbose: bool) -> photo_uploader::Result<UploaderConfig> {
    let mut config = if path.exists() {
        UploaderConfig::from_file(path)?
    } else {
        UploaderConfig::default()
    };
    if verbose {
        config.log_level = LogLevel::Debug;
    }
    logging::init(config.log_level);
    if !path.exists() {
        log::warn!("No configuration at {}, using defaults", path.display());
    }
    Ok(config)
}

/// Resolve `AskUser` by asking on stdin; "always" and "never" are remembered
fn resolve_action(config: &mut UploaderConfig, config_path: &Path) -> io::Result<PostUploadAction> {
    if config.post_upload_action != PostUploadAction::AskUser {
        return Ok(config.post_upload_action);
    }

    print!("Open the album page? [y/N/always/never] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;

    let (action, remember) = match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => (PostUploadAction::OpenAlbum, false),
        "always" => (PostUploadAction::OpenAlbum, true),
        "never" => (PostUploadAction::StayHere, true),
        _ => (PostUploadAction::StayHere, false),
    };
    if remember {
        config.post_upload_action = action;
        if let Err(e) = config.save(config_path) {
            log::warn!("Could not save {}: {}", config_path.display(), e);
        }
    }
    Ok(action)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli().get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut config = load_config(&config_path, matches.get_flag("verbose"))?;
    let api = Arc::new(RestClient::new(&config)?);

    match matches.subcommand() {
        Some(("albums", _)) => {
            let albums = fetch_albums(api.as_ref()).await?;
            if albums.is_empty() {
                println!("No albums");
            }
            for album in albums {
                println!("{}\t{}", album.aid, album.name);
            }
        }
        Some(("upload", sub_matches)) => {
            if !has_app_permission(api.as_ref(), UPLOAD_PERMISSION).await? {
                println!("This application may not upload photos yet. Grant access at:");
                println!("  {}", authorize_url(&config.api_key, UPLOAD_PERMISSION)?);
                return Err("photo upload permission missing".into());
            }

            let album = match sub_matches.get_one::<String>("album") {
                Some(aid) => aid.parse::<AlbumId>()?,
                None => config.last_album_id.clone().unwrap_or_default(),
            };
            let caption = sub_matches.get_one::<String>("caption").cloned();
            let tags = sub_matches
                .get_many::<String>("tag")
                .unwrap_or_default()
                .map(|spec| parse_tag(spec))
                .collect::<Result<Vec<Tag>, String>>()?;
            let files: Vec<PathBuf> = sub_matches
                .get_many::<String>("files")
                .unwrap_or_default()
                .map(PathBuf::from)
                .collect();

            let mut photos = PhotoCollection::new();
            photos.subscribe(|change| log::debug!("Collection changed: {:?}", change));
            for key in photos.add(files) {
                photos.update(key, |photo| {
                    if let Some(ref caption) = caption {
                        photo.set_caption(caption.as_str());
                    }
                    for tag in &tags {
                        photo.add_tag(tag.clone());
                    }
                });
            }

            let pipeline = Arc::new(UploadPipeline::from_config(
                &config,
                collection::shared(photos),
                api.clone(),
                Arc::new(ImageResizer::new()),
            ));

            let on_signal = pipeline.clone();
            let signal_task = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("\nStopping after the current photo...");
                    on_signal.cancel();
                }
            });

            let callbacks = UploadCallbacks::new()
                .on_progress(|p| {
                    print!(
                        "\r{:5.1}%  photo {}/{}",
                        p.percentage, p.current_photo, p.total_photos
                    );
                    let _ = io::stdout().flush();
                })
                .on_complete(|| println!("\nUpload complete"))
                .on_cancelled(|| println!("\nUpload cancelled"))
                .on_error(|message, err| eprintln!("\n{} [{}]: {}", message, err.kind(), err));

            let summary = pipeline.start(album.clone(), callbacks).await;
            signal_task.abort();
            let summary = summary?;

            if !album.is_default() {
                config.last_album_id = Some(album.clone());
                if let Err(e) = config.save(&config_path) {
                    log::warn!("Could not save {}: {}", config_path.display(), e);
                }
            }

            if summary.is_complete() {
                let action = resolve_action(&mut config, &config_path)?;
                if let Some(url) = action.target_url(&album) {
                    println!("Album page: {}", url);
                }
            }
        }
        _ => return Err("missing subcommand".into()),
    }

    Ok(())
}
