//! Drives an [`AtlasParser`] against a callback-based [`TextureLoader`].
//!
//! Pages are loaded one at a time in declaration order. Each loader callback
//! resumes parsing from where the page header left off, so the next page's
//! image is only requested after the previous one resolved. A loader that
//! never calls back stalls the parse; there is no timeout.
//!
//! A load that ends in an error disposes every page image it holds, including
//! pages of an atlas passed in with [`AtlasLoad::into_atlas`], before the error
//! is reported.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::AtlasError;
use crate::model::Atlas;
use crate::parser::{AtlasParser, ParseStep};
use crate::texture::{SharedImage, TextureLoader};

pub type CompletionCallback = Box<dyn FnOnce(Result<Atlas, AtlasError>)>;

/// Builder for one asynchronous atlas load.
pub struct AtlasLoad {
    text: String,
    atlas: Atlas,
    loader: Option<Rc<dyn TextureLoader>>,
}

impl AtlasLoad {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            atlas: Atlas::new(),
            loader: None,
        }
    }

    pub fn texture_loader(mut self, loader: Rc<dyn TextureLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Appends to an existing atlas instead of a fresh one.
    pub fn into_atlas(mut self, atlas: Atlas) -> Self {
        self.atlas = atlas;
        self
    }

    /// Starts parsing. `on_complete` runs exactly once, possibly before this
    /// returns when the loader answers synchronously.
    ///
    /// Returns [`AtlasError::MissingTextureLoader`] without reading any line
    /// if no loader was set.
    pub fn start<F>(self, on_complete: F) -> Result<(), AtlasError>
    where
        F: FnOnce(Result<Atlas, AtlasError>) + 'static,
    {
        let loader = self.loader.ok_or(AtlasError::MissingTextureLoader)?;
        let session = Rc::new(LoadSession {
            parser: RefCell::new(AtlasParser::with_atlas(self.text, self.atlas)),
            loader,
            on_complete: RefCell::new(Some(Box::new(on_complete))),
        });
        drive(session);
        Ok(())
    }
}

struct LoadSession {
    parser: RefCell<AtlasParser>,
    loader: Rc<dyn TextureLoader>,
    on_complete: RefCell<Option<CompletionCallback>>,
}

impl LoadSession {
    fn complete(&self, result: Result<Atlas, AtlasError>) {
        let callback = self.on_complete.borrow_mut().take();
        if let Some(callback) = callback {
            callback(result);
        }
    }

    fn fail(&self, err: AtlasError) {
        let atlas = self.parser.borrow_mut().take_atlas();
        release_partial(atlas, &err);
        self.complete(Err(err));
    }
}

fn release_partial(atlas: Atlas, err: &AtlasError) {
    if !atlas.pages().is_empty() {
        log::warn!(
            "Atlas load failed ({err}); releasing {} loaded pages",
            atlas.pages().len()
        );
    }
    atlas.dispose();
}

fn drive(session: Rc<LoadSession>) {
    // The parser borrow must end before the loader runs: a synchronous loader
    // re-enters `resume` from inside `load`.
    let step = session.parser.borrow_mut().advance();
    match step {
        Ok(ParseStep::LoadTexture(page)) => {
            let resumed = Rc::clone(&session);
            session
                .loader
                .load(&page, Box::new(move |image| resume(resumed, image)));
        }
        Ok(ParseStep::Finished) => {
            let atlas = session.parser.borrow_mut().take_atlas();
            session.complete(Ok(atlas));
        }
        Err(err) => {
            log::error!("Atlas parse failed: {err}");
            session.fail(err);
        }
    }
}

fn resume(session: Rc<LoadSession>, image: Option<SharedImage>) {
    let resolved = session.parser.borrow_mut().resolve_texture(image);
    match resolved {
        Ok(()) => drive(session),
        Err(err) => session.fail(err),
    }
}

/// Parses `text` with a loader that answers immediately.
pub fn parse_atlas<F>(text: impl Into<String>, mut load_image: F) -> Result<Atlas, AtlasError>
where
    F: FnMut(&str) -> Option<SharedImage>,
{
    let mut parser = AtlasParser::new(text);
    match run_to_end(&mut parser, &mut load_image) {
        Ok(()) => Ok(parser.into_atlas()),
        Err(err) => {
            release_partial(parser.into_atlas(), &err);
            Err(err)
        }
    }
}

fn run_to_end<F>(parser: &mut AtlasParser, load_image: &mut F) -> Result<(), AtlasError>
where
    F: FnMut(&str) -> Option<SharedImage>,
{
    loop {
        match parser.advance()? {
            ParseStep::LoadTexture(page) => parser.resolve_texture(load_image(&page))?,
            ParseStep::Finished => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::FakeImage;
    use crate::texture::TextureCallback;
    use std::cell::Cell;
    use std::collections::VecDeque;

    const ATLAS: &str = "
first.png
size: 64, 64
format: RGBA8888
filter: Linear, Linear
repeat: none
a
  rotate: false
  xy: 0, 0
  size: 8, 8
  orig: 8, 8
  offset: 0, 0
  index: -1
b
  rotate: false
  xy: 8, 0
  size: 8, 8
  orig: 8, 8
  offset: 0, 0
  index: -1

second.png
size: 32, 32
format: RGBA8888
filter: Nearest, Nearest
repeat: none
a
  rotate: false
  xy: 0, 0
  size: 4, 4
  orig: 4, 4
  offset: 0, 0
  index: -1
";

    /// Loader that queues requests until the test answers them.
    #[derive(Default)]
    struct DeferredLoader {
        requests: RefCell<Vec<String>>,
        pending: RefCell<VecDeque<TextureCallback>>,
    }

    impl TextureLoader for DeferredLoader {
        fn load(&self, page_name: &str, done: TextureCallback) {
            self.requests.borrow_mut().push(page_name.to_string());
            self.pending.borrow_mut().push_back(done);
        }
    }

    impl DeferredLoader {
        fn answer(&self, image: Option<SharedImage>) {
            let done = self
                .pending
                .borrow_mut()
                .pop_front()
                .expect("a load should be pending");
            done(image);
        }
    }

    /// Loader that answers inside `load`.
    struct ImmediateLoader {
        calls: Cell<u32>,
    }

    impl TextureLoader for ImmediateLoader {
        fn load(&self, _page_name: &str, done: TextureCallback) {
            self.calls.set(self.calls.get() + 1);
            done(Some(FakeImage::new(64, 64, 1.0) as SharedImage));
        }
    }

    type Outcome = Rc<RefCell<Option<Result<Atlas, AtlasError>>>>;

    fn capture() -> (Outcome, impl FnOnce(Result<Atlas, AtlasError>) + 'static) {
        let outcome: Outcome = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&outcome);
        (outcome, move |result| {
            *sink.borrow_mut() = Some(result);
        })
    }

    #[test]
    fn missing_loader_is_reported_synchronously() {
        let (outcome, on_complete) = capture();
        let err = AtlasLoad::new(ATLAS)
            .start(on_complete)
            .expect_err("no loader");
        assert_eq!(err, AtlasError::MissingTextureLoader);
        assert!(outcome.borrow().is_none());
    }

    #[test]
    fn pages_load_sequentially() {
        let loader = Rc::new(DeferredLoader::default());
        let (outcome, on_complete) = capture();
        AtlasLoad::new(ATLAS)
            .texture_loader(loader.clone())
            .start(on_complete)
            .expect("start");

        assert_eq!(*loader.requests.borrow(), vec!["first.png"]);
        assert!(outcome.borrow().is_none());

        loader.answer(Some(FakeImage::new(64, 64, 1.0) as SharedImage));
        assert_eq!(*loader.requests.borrow(), vec!["first.png", "second.png"]);
        assert!(outcome.borrow().is_none());

        loader.answer(Some(FakeImage::new(32, 32, 1.0) as SharedImage));
        let atlas = outcome
            .borrow_mut()
            .take()
            .expect("completion ran")
            .expect("atlas loaded");
        assert_eq!(atlas.pages().len(), 2);
        assert_eq!(atlas.regions().len(), 3);
        assert_eq!(atlas.find_region("a").map(|r| r.page), Some(0));
    }

    #[test]
    fn first_page_failure_stops_the_load() {
        let loose = FakeImage::new(4, 4, 1.0);
        let mut existing = Atlas::new();
        existing.add_texture("loose", Rc::clone(&loose) as SharedImage);
        let loader = Rc::new(DeferredLoader::default());
        let (outcome, on_complete) = capture();
        AtlasLoad::new(ATLAS)
            .texture_loader(loader.clone())
            .into_atlas(existing)
            .start(on_complete)
            .expect("start");

        loader.answer(None);
        // Only the page handed in up front was held, and it was released.
        assert_eq!(loose.dispose_count.get(), 1);
        assert_eq!(Rc::strong_count(&loose), 1);
        let result = outcome.borrow_mut().take().expect("completion ran");
        assert_eq!(
            result.expect_err("load failure"),
            AtlasError::PageLoadFailed {
                page: "first.png".to_string()
            }
        );
        assert_eq!(*loader.requests.borrow(), vec!["first.png"]);
        assert!(loader.pending.borrow().is_empty());
    }

    #[test]
    fn later_page_failure_releases_loaded_pages() {
        let loose = FakeImage::new(4, 4, 1.0);
        let mut existing = Atlas::new();
        existing.add_texture("loose", Rc::clone(&loose) as SharedImage);
        let first = FakeImage::new(64, 64, 1.0);
        let loader = Rc::new(DeferredLoader::default());
        let (outcome, on_complete) = capture();
        AtlasLoad::new(ATLAS)
            .texture_loader(loader.clone())
            .into_atlas(existing)
            .start(on_complete)
            .expect("start");

        loader.answer(Some(Rc::clone(&first) as SharedImage));
        loader.answer(None);

        let result = outcome.borrow_mut().take().expect("completion ran");
        assert_eq!(
            result.expect_err("load failure"),
            AtlasError::PageLoadFailed {
                page: "second.png".to_string()
            }
        );
        assert_eq!(first.dispose_count.get(), 1);
        assert_eq!(loose.dispose_count.get(), 1);
        assert_eq!(Rc::strong_count(&first), 1);
    }

    #[test]
    fn parse_atlas_releases_pages_on_error() {
        let first = FakeImage::new(64, 64, 1.0);
        let handed_out = Rc::clone(&first);
        let mut answers = vec![None, Some(handed_out as SharedImage)];
        let err = parse_atlas(ATLAS, |_| answers.pop().flatten()).expect_err("second page fails");
        assert_eq!(
            err,
            AtlasError::PageLoadFailed {
                page: "second.png".to_string()
            }
        );
        assert_eq!(first.dispose_count.get(), 1);
    }

    #[test]
    fn synchronous_loader_completes_before_start_returns() {
        let loader = Rc::new(ImmediateLoader { calls: Cell::new(0) });
        let (outcome, on_complete) = capture();
        AtlasLoad::new(ATLAS)
            .texture_loader(loader.clone())
            .start(on_complete)
            .expect("start");

        assert_eq!(loader.calls.get(), 2);
        let atlas = outcome
            .borrow_mut()
            .take()
            .expect("completion ran")
            .expect("atlas");
        assert_eq!(atlas.pages().len(), 2);
    }

    #[test]
    fn format_errors_reach_the_completion() {
        let loader = Rc::new(ImmediateLoader { calls: Cell::new(0) });
        let (outcome, on_complete) = capture();
        AtlasLoad::new("p.png\nformat: RGBA8888\nfilter: Linear, Linear\nrepeat: none\nhead\nrotate false\n")
            .texture_loader(loader)
            .start(on_complete)
            .expect("start");

        let result = outcome.borrow_mut().take().expect("completion ran");
        assert!(result.expect_err("format error").is_format_error());
    }

    #[test]
    fn load_appends_to_given_atlas() {
        let mut existing = Atlas::new();
        existing.add_texture("loose", FakeImage::new(4, 4, 1.0) as SharedImage);
        let loader = Rc::new(ImmediateLoader { calls: Cell::new(0) });
        let (outcome, on_complete) = capture();
        AtlasLoad::new(ATLAS)
            .texture_loader(loader)
            .into_atlas(existing)
            .start(on_complete)
            .expect("start");

        let atlas = outcome
            .borrow_mut()
            .take()
            .expect("completion ran")
            .expect("atlas");
        assert_eq!(atlas.pages().len(), 3);
        assert_eq!(atlas.regions()[0].name, "loose");
    }

    #[test]
    fn parse_atlas_uses_closure_loader() {
        let mut requested = Vec::new();
        let atlas = parse_atlas(ATLAS, |page| {
            requested.push(page.to_string());
            Some(FakeImage::new(64, 64, 1.0) as SharedImage)
        })
        .expect("atlas");
        assert_eq!(requested, vec!["first.png", "second.png"]);
        assert_eq!(atlas.regions().len(), 3);

        let err = parse_atlas(ATLAS, |_| None).expect_err("failure");
        assert_eq!(
            err,
            AtlasError::PageLoadFailed {
                page: "first.png".to_string()
            }
        );
    }
}
