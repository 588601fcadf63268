use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::future::join_all;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::app::{AppContext, PanelsError, Result};
use crate::domain::{Publication, PublicationKind};
use crate::feed::{FeedAction, FeedChange, FeedDataProvider, ImageTarget, UiThread};
use crate::loader::{CharacterLoader, PublicationLoader, PublicationRequest};

const PREVIEW_LEN: usize = 3;

pub struct FeedOptions {
    pub character_id: u64,
    pub kind: Option<PublicationKind>,
    pub pages: Option<u32>,
    pub prefetch: bool,
    pub hero: Option<PathBuf>,
}

pub async fn list_characters(ctx: &AppContext, page: u32) -> Result<()> {
    ctx.require_credentials()?;

    let characters = ctx
        .catalog
        .characters(page, &CancellationToken::new())
        .await?;

    if characters.is_empty() {
        println!("No characters on page {}", page);
        return Ok(());
    }

    for character in characters {
        println!("{:>8}  {}", character.id, character.name);
    }

    Ok(())
}

pub async fn show_character(ctx: &AppContext, id: u64) -> Result<()> {
    ctx.require_credentials()?;

    let cancel = CancellationToken::new();
    let character = ctx.catalog.character(id, &cancel).await?;

    println!("{} ({})", character.name, character.id);
    println!("  {}", character.display_description());

    let previews = join_all(PublicationKind::ALL.iter().map(|&kind| {
        let cancel = &cancel;
        async move {
            let request = PublicationRequest {
                character_id: id,
                kind,
                page: 0,
            };
            (kind, ctx.catalog.publications(request, cancel).await)
        }
    }))
    .await;

    for (kind, result) in previews {
        println!(
            "\n{} ({})",
            kind.display_name(),
            character.appearances.count(kind)
        );
        match result {
            Ok(items) => {
                for item in items.iter().take(PREVIEW_LEN) {
                    println!("  {}", item.title());
                }
            }
            Err(e) => eprintln!("  Error loading {}: {}", kind, e),
        }
    }

    Ok(())
}

pub async fn show_feed(ctx: &AppContext, options: FeedOptions) -> Result<()> {
    ctx.require_credentials()?;

    let kind = options.kind.unwrap_or(ctx.config.feed.default_kind);
    let pages = options.pages.unwrap_or(ctx.config.feed.pages).max(1);
    let wait = Duration::from_secs(ctx.config.feed.wait_secs);
    let character_id = options.character_id;

    let ui = UiThread::spawn("panels-ui")?;
    let feed = ctx.feed(Handle::current(), Arc::new(ui.handle()));

    let (tx, mut rx) = mpsc::unbounded_channel::<FeedChange>();
    feed.subscribe(Arc::new(move |change: &FeedChange| {
        let _ = tx.send(change.clone());
    }));

    println!("{} for character {}", kind.display_name(), character_id);

    feed.dispatch(FeedAction::LoadFromStart { character_id, kind });
    let mut change = next_change(&mut rx, wait).await?;
    print_change(&feed.items(), &change)?;

    for _ in 1..pages {
        let exhausted = match &change {
            FeedChange::Replaced { count } => *count == 0,
            FeedChange::Appended { range } => range.is_empty(),
            FeedChange::LoadFailed { .. } => true,
        };
        if exhausted {
            break;
        }

        feed.dispatch(FeedAction::LoadMore { character_id, kind });
        change = next_change(&mut rx, wait).await?;
        print_change(&feed.items(), &change)?;
    }

    let items = feed.items();
    let presentable = items.iter().filter(|p| p.is_presentable()).count();
    println!("{} items, {} with thumbnails", items.len(), presentable);

    if options.prefetch {
        println!("Prefetching thumbnails...");
        feed.dispatch(FeedAction::PrepareForDisplay {
            indices: (0..items.len()).collect(),
        });
    }

    if let Some(path) = options.hero {
        match items.iter().position(|p| p.image_source().is_some()) {
            Some(index) => {
                let (target, done) = FileTarget::new(path.clone());
                feed.dispatch(FeedAction::SetHeroImage {
                    index,
                    target: Arc::new(target),
                });
                match tokio::time::timeout(wait, done).await {
                    Ok(Ok(result)) => {
                        result?;
                        println!("Saved thumbnail of \"{}\" to {}", items[index].title(), path.display());
                    }
                    _ => eprintln!("Thumbnail of \"{}\" did not arrive", items[index].title()),
                }
            }
            None => println!("No item has a thumbnail"),
        }
    }

    drop(feed);
    ui.shutdown();
    Ok(())
}

async fn next_change(rx: &mut mpsc::UnboundedReceiver<FeedChange>, wait: Duration) -> Result<FeedChange> {
    tokio::time::timeout(wait, rx.recv())
        .await
        .map_err(|_| PanelsError::Other("Timed out waiting for the feed".to_string()))?
        .ok_or_else(|| PanelsError::Other("Feed stopped".to_string()))
}

fn print_change(items: &[Publication], change: &FeedChange) -> Result<()> {
    let range = match change {
        FeedChange::Replaced { count } => 0..*count,
        FeedChange::Appended { range } => range.clone(),
        FeedChange::LoadFailed { error, .. } => {
            return Err(PanelsError::Other(format!("Loading failed: {}", error)));
        }
    };

    for (index, item) in items.iter().enumerate().skip(range.start).take(range.len()) {
        let date = item
            .modified_at()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "          ".to_string());
        let marker = if item.is_presentable() { "●" } else { " " };
        println!("{:>4} {} {} {}", index, marker, date, item.title());
    }

    Ok(())
}

/// Writes the downloaded image to a file and reports back once.
#[derive(Debug)]
struct FileTarget {
    path: PathBuf,
    done: Mutex<Option<oneshot::Sender<std::io::Result<()>>>>,
}

impl FileTarget {
    fn new(path: PathBuf) -> (Self, oneshot::Receiver<std::io::Result<()>>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                path,
                done: Mutex::new(Some(tx)),
            },
            rx,
        )
    }
}

impl ImageTarget for FileTarget {
    fn set_image(&self, bytes: Vec<u8>) {
        let result = std::fs::write(&self.path, &bytes);
        if let Some(tx) = self.done.lock().unwrap_or_else(PoisonError::into_inner).take() {
            let _ = tx.send(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_change_surfaces_failures() {
        let change = FeedChange::LoadFailed {
            kind: crate::feed::LoadKind::More,
            error: Arc::new(PanelsError::Other("offline".into())),
        };
        let err = print_change(&[], &change).unwrap_err();
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn test_print_change_accepts_appended_tail() {
        let items = vec![
            Publication::new(1, "A", PublicationKind::Comic),
            Publication::new(2, "B", PublicationKind::Comic),
        ];
        assert!(print_change(&items, &FeedChange::Appended { range: 1..2 }).is_ok());
        assert!(print_change(&items, &FeedChange::Replaced { count: 2 }).is_ok());
    }

    #[tokio::test]
    async fn test_file_target_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hero.jpg");
        let (target, done) = FileTarget::new(path.clone());

        target.set_image(vec![1, 2, 3]);
        target.set_image(vec![4]);

        done.await.unwrap().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![4]);
    }

    #[tokio::test]
    async fn test_next_change_times_out() {
        let (_tx, mut rx) = mpsc::unbounded_channel();
        let err = next_change(&mut rx, Duration::from_millis(10)).await.unwrap_err();
        assert!(err.to_string().contains("Timed out"));
    }
}
