//! Reads a text `.atlas` file, resolves its page images from disk and writes a
//! JSON summary of every page and region.
//!
//! Page images are looked up next to the atlas file. Only image headers are
//! read; a page named `hero@2x.png` is treated as resolution 2.

use serde::Serialize;
use skel_atlas::{Atlas, AtlasError, AtlasLoad, ImageResource, Region};
use skel_atlas::{TextureCallback, TextureLoader};
use skel_core::Disposable;
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Serialize)]
struct AtlasDump {
    source: String,
    pages: Vec<PageDump>,
    regions: Vec<RegionDump>,
}

#[derive(Debug, Serialize)]
struct PageDump {
    name: String,
    width: u32,
    height: u32,
    resolution: f32,
    min_filter: String,
    mag_filter: String,
    u_wrap: String,
    v_wrap: String,
}

#[derive(Debug, Serialize)]
struct RegionDump {
    name: String,
    page: String,
    index: i32,
    rotate: i32,
    frame: RectDump,
    orig: RectDump,
    trim: RectDump,
    #[serde(skip_serializing_if = "Option::is_none")]
    uv: Option<[f32; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    splits: Option<[i32; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pads: Option<[i32; 4]>,
}

#[derive(Debug, Serialize)]
struct RectDump {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

impl From<skel_atlas::Rect> for RectDump {
    fn from(rect: skel_atlas::Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            w: rect.width,
            h: rect.height,
        }
    }
}

/// Page image known only by its header.
#[derive(Debug)]
struct ImageHeader {
    path: PathBuf,
    width: Cell<u32>,
    height: Cell<u32>,
    resolution: f32,
}

impl Disposable for ImageHeader {
    fn dispose(&self) {
        log::debug!("Released page image '{}'", self.path.display());
    }
}

impl ImageResource for ImageHeader {
    fn real_width(&self) -> u32 {
        self.width.get()
    }

    fn real_height(&self) -> u32 {
        self.height.get()
    }

    fn resolution(&self) -> f32 {
        self.resolution
    }

    fn is_valid(&self) -> bool {
        self.width.get() > 0 && self.height.get() > 0
    }

    fn set_size(&self, width: u32, height: u32) {
        self.width.set(width);
        self.height.set(height);
    }
}

/// Resolves page names against a directory.
struct DirectoryLoader {
    dir: PathBuf,
}

impl TextureLoader for DirectoryLoader {
    fn load(&self, page_name: &str, done: TextureCallback) {
        let path = self.dir.join(page_name);
        match image::image_dimensions(&path) {
            Ok((width, height)) => {
                log::info!("Page '{}': {}x{}", page_name, width, height);
                done(Some(Rc::new(ImageHeader {
                    resolution: resolution_from_name(page_name),
                    path,
                    width: Cell::new(width),
                    height: Cell::new(height),
                })));
            }
            Err(e) => {
                log::error!("Failed to open page image '{}': {e}", path.display());
                done(None);
            }
        }
    }
}

fn usage() -> String {
    "Usage: cargo run -p skel_atlas_dump -- <atlas_file> [json_output]\nExample: cargo run -p skel_atlas_dump -- assets/spine/hero.atlas assets/generated/hero_atlas.json".to_string()
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        return Err(usage());
    }
    let atlas_path = PathBuf::from(&args[1]);
    let json_output = args.get(2).map(PathBuf::from);

    let atlas = load_atlas_from_path(&atlas_path)?;
    let dump = build_dump(&atlas_path, &atlas);
    let json = serde_json::to_string_pretty(&dump)
        .map_err(|e| format!("Failed to serialize atlas dump: {e}"))?;

    match json_output {
        Some(output) => {
            write_output(&output, &json)?;
            println!(
                "Dumped {} pages and {} regions -> {}",
                dump.pages.len(),
                dump.regions.len(),
                output.display()
            );
        }
        None => println!("{json}"),
    }

    atlas.dispose();
    Ok(())
}

fn load_atlas_from_path(path: &Path) -> Result<Atlas, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read atlas {}: {e}", path.display()))?;
    let dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let outcome: Rc<RefCell<Option<Result<Atlas, AtlasError>>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&outcome);
    AtlasLoad::new(text)
        .texture_loader(Rc::new(DirectoryLoader { dir }))
        .start(move |result| {
            *sink.borrow_mut() = Some(result);
        })
        .map_err(|e| format!("Failed to start atlas load {}: {e}", path.display()))?;

    // DirectoryLoader answers synchronously, so the load is already complete.
    let result = outcome.borrow_mut().take();
    match result {
        Some(Ok(atlas)) => Ok(atlas),
        Some(Err(e)) => Err(format!("Failed to load atlas {}: {e}", path.display())),
        None => Err(format!("Atlas load {} did not complete", path.display())),
    }
}

fn build_dump(source: &Path, atlas: &Atlas) -> AtlasDump {
    let pages = atlas
        .pages()
        .iter()
        .map(|page| PageDump {
            name: page.name.clone(),
            width: page.width,
            height: page.height,
            resolution: page.resolution(),
            min_filter: page.min_filter.to_string(),
            mag_filter: page.mag_filter.to_string(),
            u_wrap: format!("{:?}", page.u_wrap),
            v_wrap: format!("{:?}", page.v_wrap),
        })
        .collect();
    let regions = atlas
        .regions()
        .iter()
        .map(|region| region_dump(atlas, region))
        .collect();

    AtlasDump {
        source: normalize_path_for_json(source),
        pages,
        regions,
    }
}

fn region_dump(atlas: &Atlas, region: &Region) -> RegionDump {
    RegionDump {
        name: region.name.clone(),
        page: atlas
            .page_of(region)
            .map(|page| page.name.clone())
            .unwrap_or_default(),
        index: region.index,
        rotate: region.rotate,
        frame: region.frame.into(),
        orig: region.orig.into(),
        trim: region.trim.into(),
        uv: atlas.uv_rect(region),
        splits: region.splits,
        pads: region.pads,
    }
}

/// `hero@2x.png` → 2. Anything without a `@<n>x` suffix is 1.
fn resolution_from_name(page_name: &str) -> f32 {
    Path::new(page_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit_once('@'))
        .and_then(|(_, suffix)| suffix.strip_suffix('x'))
        .and_then(|scale| scale.parse::<f32>().ok())
        .filter(|scale| *scale >= 1.0)
        .unwrap_or(1.0)
}

fn normalize_path_for_json(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn temporary_output_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("output");
    path.with_file_name(format!("{file_name}.tmp"))
}

fn write_output(path: &Path, contents: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create output dir '{}': {e}", parent.display()))?;
    }
    let tmp = temporary_output_path(path);
    fs::write(&tmp, contents).map_err(|e| format!("Failed to write '{}': {e}", tmp.display()))?;
    if path.exists() {
        fs::remove_file(path).map_err(|e| {
            format!("Failed to replace existing output '{}': {e}", path.display())
        })?;
    }
    fs::rename(&tmp, path).map_err(|e| {
        format!(
            "Failed to move temporary output '{}' -> '{}': {e}",
            tmp.display(),
            path.display()
        )
    })
}
