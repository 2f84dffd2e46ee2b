// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: in-memory directory and status source.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::watch;

use crate::error::DirectoryError;
use crate::interaction::InteractionDef;
use crate::presence::{ClientStatus, Directory, StatusSource, StatusStream};

/// Build a minimal interaction definition.
pub fn interaction_def(
    name: &str,
    role: &str,
    namespace: &str,
    application: &str,
    max: u32,
) -> InteractionDef {
    InteractionDef {
        name: name.to_owned(),
        role: role.to_owned(),
        namespace: namespace.to_owned(),
        application: application.to_owned(),
        max,
        ..Default::default()
    }
}

/// Status of a client running `app`.
pub fn running(id: &str, app: &str) -> ClientStatus {
    ClientStatus {
        id: id.to_owned(),
        name: id.to_owned(),
        platform_info: "rocon:/pc/*/*/linux".to_owned(),
        running_app: true,
        app_name: app.to_owned(),
    }
}

/// Status of a client with nothing running.
pub fn idle(id: &str) -> ClientStatus {
    ClientStatus {
        id: id.to_owned(),
        name: id.to_owned(),
        platform_info: "rocon:/pc/*/*/linux".to_owned(),
        running_app: false,
        app_name: String::new(),
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone)]
enum Listing {
    Channels(Vec<String>),
    Transient,
    Failure,
}

/// Directory whose listing is set directly by the test.
pub struct MemoryDirectory {
    listing: Mutex<Listing>,
    calls: AtomicUsize,
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self { listing: Mutex::new(Listing::Channels(vec![])), calls: AtomicUsize::new(0) }
    }

    pub fn set<S: AsRef<str>>(&self, channels: &[S]) {
        let channels = channels.iter().map(|c| c.as_ref().to_owned()).collect();
        *lock(&self.listing) = Listing::Channels(channels);
    }

    pub fn fail_transient(&self) {
        *lock(&self.listing) = Listing::Transient;
    }

    pub fn fail_permanently(&self) {
        *lock(&self.listing) = Listing::Failure;
    }

    /// Number of listing calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Directory for MemoryDirectory {
    fn list_channels(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, DirectoryError>> + Send + '_>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let listing = lock(&self.listing).clone();
        Box::pin(async move {
            match listing {
                Listing::Channels(c) => Ok(c),
                Listing::Transient => Err(DirectoryError::Transient("test outage".to_owned())),
                Listing::Failure => Err(DirectoryError::Failure("test failure".to_owned())),
            }
        })
    }
}

/// Directory that never answers, for exercising the listing timeout.
pub struct StalledDirectory;

impl Directory for StalledDirectory {
    fn list_channels(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, DirectoryError>> + Send + '_>> {
        Box::pin(std::future::pending())
    }
}

/// Latched per-channel status feeds.
///
/// A status published before the monitor subscribes is still delivered,
/// matching how a late subscriber sees the client's most recent report.
#[derive(Default)]
pub struct MemoryStatusSource {
    feeds: Mutex<HashMap<String, watch::Sender<Option<ClientStatus>>>>,
    active: Arc<AtomicUsize>,
}

impl MemoryStatusSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn feed(&self, channel: &str) -> watch::Sender<Option<ClientStatus>> {
        lock(&self.feeds).entry(channel.to_owned()).or_insert_with(|| watch::channel(None).0).clone()
    }

    /// Publish a status on `channel`.
    pub fn publish(&self, channel: &str, status: ClientStatus) {
        self.feed(channel).send_replace(Some(status));
    }

    /// Number of subscriptions currently open.
    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

struct SubscriptionGuard(Arc<AtomicUsize>);

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl StatusSource for MemoryStatusSource {
    fn subscribe(
        &self,
        channel: &str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<StatusStream>> + Send + '_>> {
        let mut rx = self.feed(channel).subscribe();
        rx.mark_changed();
        self.active.fetch_add(1, Ordering::SeqCst);
        let guard = SubscriptionGuard(Arc::clone(&self.active));

        let stream = futures_util::stream::unfold((rx, guard), |(mut rx, guard)| async move {
            loop {
                rx.changed().await.ok()?;
                let latest = rx.borrow_and_update().clone();
                if let Some(status) = latest {
                    return Some((status, (rx, guard)));
                }
            }
        });
        Box::pin(async move { Ok(stream.boxed()) })
    }
}

/// Poll `cond` every few milliseconds until it holds or `timeout` elapses.
pub async fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if cond() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
