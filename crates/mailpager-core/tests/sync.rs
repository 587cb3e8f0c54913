//! Controller behavior against a scripted in-memory mailbox.

#![allow(clippy::unwrap_used)]

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;
use tokio::sync::mpsc;

use mailpager_core::{
    DecodeError, MailSource, MailboxInfo, MessageList, MimeDecoder, RawMessage, SyncCommand,
    SyncController, SyncError, SyncEvent,
};

const PAGE: u32 = 25;
const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Default)]
struct Mailbox {
    /// Sizes reported by successive selects; the last one repeats.
    sizes: VecDeque<u32>,
    fetches: Vec<(u32, u32)>,
    without_body: HashSet<u32>,
    /// Sequence numbers the server leaves out of its answer.
    omitted: HashSet<u32>,
    fail_fetch: bool,
    stall_fetch: bool,
}

#[derive(Clone, Default)]
struct FakeSource(Arc<Mutex<Mailbox>>);

impl FakeSource {
    fn with_size(size: u32) -> Self {
        let source = Self::default();
        source.0.lock().unwrap().sizes.push_back(size);
        source
    }

    fn grow_to(&self, size: u32) {
        let mut mailbox = self.0.lock().unwrap();
        mailbox.sizes.clear();
        mailbox.sizes.push_back(size);
    }

    fn fetches(&self) -> Vec<(u32, u32)> {
        self.0.lock().unwrap().fetches.clone()
    }
}

fn raw_message(seq: u32) -> Vec<u8> {
    format!(
        "From: sender{seq}@example.com\r\n\
         Subject: Message {seq}\r\n\
         Date: Tue, 1 Jul 2025 10:00:00 +0000\r\n\
         \r\n\
         Body {seq}\r\n"
    )
    .into_bytes()
}

impl MailSource for FakeSource {
    async fn select(&mut self) -> mailpager_imap::Result<MailboxInfo> {
        let mut mailbox = self.0.lock().unwrap();
        let size = if mailbox.sizes.len() > 1 {
            mailbox.sizes.pop_front().unwrap()
        } else {
            mailbox.sizes.front().copied().unwrap_or(0)
        };
        Ok(MailboxInfo {
            message_count: size,
        })
    }

    async fn fetch_range(
        &mut self,
        first: u32,
        last: u32,
    ) -> mailpager_imap::Result<Vec<RawMessage>> {
        let stall = {
            let mut mailbox = self.0.lock().unwrap();
            mailbox.fetches.push((first, last));
            if mailbox.fail_fetch {
                return Err(mailpager_imap::Error::No("fetch refused".to_string()));
            }
            mailbox.stall_fetch
        };
        if stall {
            std::future::pending::<()>().await;
        }
        let mailbox = self.0.lock().unwrap();
        Ok((first..=last)
            .filter(|seq| !mailbox.omitted.contains(seq))
            .map(|seq| RawMessage {
                seq,
                body: (!mailbox.without_body.contains(&seq)).then(|| raw_message(seq)),
            })
            .collect())
    }
}

fn controller(source: &FakeSource) -> SyncController<FakeSource, MimeDecoder> {
    SyncController::with_limits(source.clone(), MimeDecoder, PAGE, TIMEOUT)
}

fn inserted_at_end(events: &[SyncEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            SyncEvent::InsertAtEnd(view) => Some(view.id),
            _ => None,
        })
        .collect()
}

fn inserted_at_start(events: &[SyncEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            SyncEvent::InsertAtStart(view) => Some(view.id),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn initial_load_fetches_newest_page() {
    let source = FakeSource::with_size(40);
    let mut sync = controller(&source);

    let events = sync.initial_load().await.unwrap();

    assert_eq!(source.fetches(), vec![(16, 40)]);
    assert_eq!(inserted_at_end(&events), (16..=40).rev().collect::<Vec<_>>());
    assert_eq!(events.len(), 25);
    assert_eq!(sync.store().count(), 25);
    assert_eq!(sync.store().known_mailbox_size(), 40);
    assert!(!sync.is_exhausted());
    assert!(matches!(&events[0], SyncEvent::InsertAtEnd(v) if v.summary.starts_with("40. [sender40@example.com] Message 40")));
}

#[tokio::test]
async fn load_more_reaches_the_oldest_message() {
    let source = FakeSource::with_size(40);
    let mut sync = controller(&source);
    sync.initial_load().await.unwrap();

    let events = sync.load_more().await.unwrap();

    assert_eq!(source.fetches(), vec![(16, 40), (1, 15)]);
    assert_eq!(inserted_at_end(&events), (1..=15).rev().collect::<Vec<_>>());
    assert_eq!(events.last(), Some(&SyncEvent::Exhausted));
    assert_eq!(sync.store().count(), 40);
    assert_eq!(sync.store().known_mailbox_size(), 40);
    assert_eq!(sync.store().ids(), (1..=40).rev().collect::<Vec<_>>());
}

#[tokio::test]
async fn load_more_after_exhaustion_is_a_no_op() {
    let source = FakeSource::with_size(40);
    let mut sync = controller(&source);
    sync.initial_load().await.unwrap();
    sync.load_more().await.unwrap();

    let events = sync.load_more().await.unwrap();

    assert!(events.is_empty());
    assert_eq!(source.fetches().len(), 2);
    assert_eq!(sync.store().count(), 40);
}

#[tokio::test]
async fn small_and_empty_mailboxes_are_exhausted_at_once() {
    let source = FakeSource::with_size(10);
    let mut sync = controller(&source);
    let events = sync.initial_load().await.unwrap();
    assert_eq!(source.fetches(), vec![(1, 10)]);
    assert_eq!(events.len(), 11);
    assert_eq!(events.last(), Some(&SyncEvent::Exhausted));

    let source = FakeSource::with_size(0);
    let mut sync = controller(&source);
    let events = sync.initial_load().await.unwrap();
    assert_eq!(events, vec![SyncEvent::Exhausted]);
    assert!(source.fetches().is_empty());
    assert!(sync.load_more().await.unwrap().is_empty());
}

#[tokio::test]
async fn refresh_inserts_new_mail_at_the_start() {
    let source = FakeSource::with_size(40);
    let mut sync = controller(&source);
    sync.initial_load().await.unwrap();
    source.grow_to(43);

    let events = sync.refresh().await.unwrap();

    assert_eq!(source.fetches(), vec![(16, 40), (41, 43)]);
    assert_eq!(inserted_at_start(&events), vec![41, 42, 43]);
    assert_eq!(events.len(), 3);
    assert_eq!(sync.store().known_mailbox_size(), 43);
    assert_eq!(&sync.store().ids()[..4], &[43, 42, 41, 40]);

    // The next page continues below the oldest loaded message.
    let events = sync.load_more().await.unwrap();
    assert_eq!(source.fetches().last(), Some(&(1, 15)));
    assert_eq!(inserted_at_end(&events).first(), Some(&15));
}

#[tokio::test]
async fn refresh_without_new_mail_changes_nothing() {
    let source = FakeSource::with_size(40);
    let mut sync = controller(&source);
    sync.initial_load().await.unwrap();

    let events = sync.refresh().await.unwrap();

    assert!(events.is_empty());
    assert_eq!(source.fetches().len(), 1);
    assert_eq!(sync.store().known_mailbox_size(), 40);
    assert_eq!(sync.store().count(), 25);
}

#[tokio::test]
async fn shrinking_mailbox_is_recorded_without_events() {
    let source = FakeSource::with_size(40);
    let mut sync = controller(&source);
    sync.initial_load().await.unwrap();
    source.grow_to(38);

    assert!(sync.refresh().await.unwrap().is_empty());
    assert_eq!(sync.store().known_mailbox_size(), 38);
    assert_eq!(source.fetches().len(), 1);
}

#[tokio::test]
async fn decode_failure_aborts_the_whole_batch() {
    let source = FakeSource::with_size(40);
    source.0.lock().unwrap().without_body.insert(30);
    let mut sync = controller(&source);

    let err = sync.initial_load().await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Decode {
            seq: 30,
            source: DecodeError::MissingBody
        }
    ));
    assert_eq!(sync.store().count(), 0);
}

#[tokio::test]
async fn decode_failure_during_refresh_keeps_known_size() {
    let source = FakeSource::with_size(40);
    let mut sync = controller(&source);
    sync.initial_load().await.unwrap();
    source.grow_to(43);
    source.0.lock().unwrap().without_body.insert(43);

    assert!(sync.refresh().await.is_err());
    assert_eq!(sync.store().count(), 25);
    assert_eq!(sync.store().known_mailbox_size(), 40);
}

#[tokio::test]
async fn record_left_out_of_a_fetch_is_fatal() {
    let source = FakeSource::with_size(40);
    source.0.lock().unwrap().omitted.insert(30);
    let mut sync = controller(&source);

    let err = sync.initial_load().await.unwrap_err();

    assert!(matches!(
        &err,
        SyncError::Incomplete { range, missing: 30 } if range == "16:40"
    ));
    assert_eq!(sync.store().count(), 0);
    assert!(!sync.is_exhausted());
}

#[tokio::test]
async fn record_left_out_of_a_refresh_keeps_known_size() {
    let source = FakeSource::with_size(40);
    let mut sync = controller(&source);
    sync.initial_load().await.unwrap();
    source.grow_to(43);
    source.0.lock().unwrap().omitted.insert(42);

    let err = sync.refresh().await.unwrap_err();

    assert!(matches!(err, SyncError::Incomplete { missing: 42, .. }));
    assert_eq!(sync.store().count(), 25);
    assert_eq!(sync.store().known_mailbox_size(), 40);
}

#[tokio::test]
async fn fetch_failure_names_the_range() {
    let source = FakeSource::with_size(40);
    source.0.lock().unwrap().fail_fetch = true;
    let mut sync = controller(&source);

    let err = sync.initial_load().await.unwrap_err();

    assert!(matches!(&err, SyncError::Fetch { range, .. } if range == "16:40"));
    assert!(err.to_string().contains("fetch refused"));
}

#[tokio::test(start_paused = true)]
async fn stalled_fetch_times_out() {
    let source = FakeSource::with_size(40);
    source.0.lock().unwrap().stall_fetch = true;
    let mut sync = controller(&source);

    let err = sync.initial_load().await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Timeout {
            operation: "fetch",
            after: TIMEOUT
        }
    ));
    assert_eq!(sync.store().count(), 0);
}

#[tokio::test]
async fn run_serves_commands_in_order() {
    let source = FakeSource::with_size(40);
    source.0.lock().unwrap().sizes = VecDeque::from([40, 43]);
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    command_tx.send(SyncCommand::LoadMore).unwrap();
    command_tx.send(SyncCommand::Refresh).unwrap();
    command_tx.send(SyncCommand::LoadMore).unwrap();
    command_tx.send(SyncCommand::Quit).unwrap();
    command_tx.send(SyncCommand::LoadMore).unwrap();

    controller(&source)
        .run(command_rx, event_tx)
        .await
        .unwrap();

    let mut list = MessageList::new();
    while let Ok(event) = event_rx.try_recv() {
        list.apply(event);
    }
    assert!(list.is_exhausted());
    assert_eq!(list.len(), 43);
    let ids: Vec<u32> = (0..list.len()).map(|i| list.get(i).unwrap().id).collect();
    assert_eq!(ids, (1..=43).rev().collect::<Vec<_>>());
    assert_eq!(list.selection_changed(0), Some("Body 43\r\n"));
    assert_eq!(source.fetches(), vec![(16, 40), (1, 15), (41, 43)]);
}

#[tokio::test]
async fn run_reports_failure_and_stops() {
    let source = FakeSource::with_size(40);
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    command_tx.send(SyncCommand::LoadMore).unwrap();
    command_tx.send(SyncCommand::Refresh).unwrap();
    source.0.lock().unwrap().without_body.insert(3);

    let result = controller(&source).run(command_rx, event_tx).await;

    assert!(matches!(result, Err(SyncError::Decode { seq: 3, .. })));
    let mut events = Vec::new();
    while let Ok(event) = event_rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.len(), 26);
    assert!(matches!(events.last(), Some(SyncEvent::Failed(m)) if m.contains("message 3")));
    assert_eq!(source.fetches().len(), 2);
}

#[tokio::test]
async fn run_stops_when_the_ui_goes_away() {
    let source = FakeSource::with_size(40);
    let (_command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    drop(event_rx);

    assert!(controller(&source).run(command_rx, event_tx).await.is_ok());
}

#[derive(Debug, Clone)]
enum Step {
    LoadMore,
    Refresh { arrived: u32 },
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::LoadMore),
        (0u32..5).prop_map(|arrived| Step::Refresh { arrived }),
    ]
}

proptest! {
    #[test]
    fn store_stays_contiguous_and_unique(
        initial in 0u32..60,
        page in 1u32..12,
        steps in proptest::collection::vec(step(), 0..12),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        runtime.block_on(async {
            let source = FakeSource::with_size(initial);
            let mut sync = SyncController::with_limits(source.clone(), MimeDecoder, page, TIMEOUT);
            let mut list = MessageList::new();
            let mut size = initial;

            for event in sync.initial_load().await.unwrap() {
                list.apply(event);
            }
            for step in steps {
                let events = match step {
                    Step::LoadMore => sync.load_more().await.unwrap(),
                    Step::Refresh { arrived } => {
                        size += arrived;
                        source.grow_to(size);
                        sync.refresh().await.unwrap()
                    }
                };
                for event in events {
                    list.apply(event);
                }

                let ids = sync.store().ids();
                let unique: HashSet<u32> = ids.iter().copied().collect();
                prop_assert_eq!(unique.len(), ids.len());

                // Newest first, no gaps, ending at the current mailbox size.
                let count = sync.store().count();
                let expected: Vec<u32> = (size - count + 1..=size).rev().collect();
                prop_assert_eq!(&ids, &expected);

                let shown: Vec<u32> = (0..list.len()).map(|i| list.get(i).unwrap().id).collect();
                prop_assert_eq!(&shown, &ids);
            }
            Ok(())
        })?;
    }
}
