//! Bounded pool of expensive store connections.
//!
//! The pool never waits for capacity: `acquire` on an empty idle set fails with
//! [`DatabaseError::PoolExhausted`]. The lock guards only the idle queue and is
//! never held across an `.await`.

use std::{
    collections::VecDeque,
    ops::{Deref, DerefMut},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::model::error::{DatabaseError, DatabaseResult};

pub const DEFAULT_POOL_SIZE: usize = 10;

/// Opens and probes connections for a [`ConnectionPool`].
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Connection: Send + 'static;

    async fn open(&self) -> DatabaseResult<Self::Connection>;

    async fn is_open(&self, conn: &mut Self::Connection) -> bool;

    async fn close(&self, conn: Self::Connection) {
        drop(conn);
    }
}

struct Idle<T> {
    conn: T,
    since: Instant,
}

struct Shared<T> {
    idle: Mutex<VecDeque<Idle<T>>>,
    // handles alive anywhere: idle + checked out + being replaced
    live: AtomicUsize,
}

impl<T> Shared<T> {
    fn push_idle(&self, conn: T) {
        self.idle.lock().push_back(Idle {
            conn,
            since: Instant::now(),
        });
    }
}

pub struct ConnectionPool<C: Connector> {
    connector: C,
    shared: Arc<Shared<C::Connection>>,
    capacity: usize,
    check_after: Duration,
}

impl<C: Connector> std::fmt::Debug for ConnectionPool<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("capacity", &self.capacity)
            .field("idle", &self.idle_count())
            .field("live", &self.live_count())
            .finish()
    }
}

impl<C: Connector> ConnectionPool<C> {
    /// Creates an empty pool. Nothing is opened until [`ConnectionPool::initialize`].
    pub fn new(connector: C, capacity: usize) -> Self {
        Self {
            connector,
            shared: Arc::new(Shared {
                idle: Mutex::new(VecDeque::with_capacity(capacity)),
                live: AtomicUsize::new(0),
            }),
            capacity,
            check_after: Duration::ZERO,
        }
    }

    /// Skips the liveness check for connections that sat idle for less than `check_after`.
    /// A dead connection inside that window surfaces as a statement error instead.
    pub fn with_check_after(mut self, check_after: Duration) -> Self {
        self.check_after = check_after;
        self
    }

    /// Eagerly opens connections for every free slot. A slot that fails to open is
    /// logged and left empty; returns how many connections were opened.
    #[tracing::instrument(skip(self), fields(capacity = self.capacity))]
    pub async fn initialize(&self) -> usize {
        let free = self
            .capacity
            .saturating_sub(self.shared.live.load(Ordering::SeqCst));
        let mut opened = 0;

        for slot in 0..free {
            match self.connector.open().await {
                Ok(conn) => {
                    self.shared.live.fetch_add(1, Ordering::SeqCst);
                    self.shared.push_idle(conn);
                    opened += 1;
                }
                Err(e) => {
                    tracing::error!(slot, "unable to open pooled connection: {}", e);
                }
            }
        }

        tracing::debug!(opened, "connection pool initialized");
        opened
    }

    /// Takes one idle connection. A connection found closed is replaced 1-for-1
    /// before it is handed out.
    ///
    /// Cancel-safe: a connection dropped mid-check goes back to the idle set, and a
    /// slot dropped mid-replacement is released so `initialize` can refill it.
    pub async fn acquire(&self) -> DatabaseResult<PooledConnection<C::Connection>> {
        let popped = self.shared.idle.lock().pop_front();
        let Some(Idle { conn, since }) = popped else {
            tracing::warn!(capacity = self.capacity, "connection pool exhausted");
            return Err(DatabaseError::PoolExhausted);
        };

        let mut handle = PooledConnection {
            conn: Some(conn),
            shared: Arc::clone(&self.shared),
        };
        if since.elapsed() < self.check_after || self.connector.is_open(&mut *handle).await {
            return Ok(handle);
        }

        tracing::warn!("pooled connection is closed, reopening");
        let slot = Reservation::new(Arc::clone(&self.shared));
        if let Some(dead) = handle.conn.take() {
            self.connector.close(dead).await;
        }
        match self.connector.open().await {
            Ok(conn) => Ok(slot.fill(conn)),
            Err(e) => {
                tracing::error!("unable to replace closed connection: {}", e);
                Err(e)
            }
        }
    }

    /// Puts a handle back into the idle set. No health check happens here.
    pub fn release(&self, handle: PooledConnection<C::Connection>) {
        debug_assert!(
            Arc::ptr_eq(&self.shared, &handle.shared),
            "handle released into a foreign pool"
        );
        drop(handle);
    }

    /// Removes every idle connection and closes it.
    pub async fn drain(&self) -> usize {
        let idle: Vec<_> = self.shared.idle.lock().drain(..).collect();
        let drained = idle.len();
        for Idle { conn, .. } in idle {
            self.shared.live.fetch_sub(1, Ordering::SeqCst);
            self.connector.close(conn).await;
        }
        drained
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn idle_count(&self) -> usize {
        self.shared.idle.lock().len()
    }

    pub fn live_count(&self) -> usize {
        self.shared.live.load(Ordering::SeqCst)
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }
}

/// A counted slot whose connection is being replaced. Gives the slot up when dropped
/// before [`Reservation::fill`].
struct Reservation<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    filled: bool,
}

impl<T: Send + 'static> Reservation<T> {
    fn new(shared: Arc<Shared<T>>) -> Self {
        Self {
            shared,
            filled: false,
        }
    }

    fn fill(mut self, conn: T) -> PooledConnection<T> {
        self.filled = true;
        PooledConnection {
            conn: Some(conn),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> Drop for Reservation<T> {
    fn drop(&mut self) {
        if !self.filled {
            self.shared.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Exclusively owned checkout. Returned to the idle set when released or dropped.
pub struct PooledConnection<T: Send + 'static> {
    conn: Option<T>,
    shared: Arc<Shared<T>>,
}

impl<T: Send + 'static> Deref for PooledConnection<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.conn.as_ref().expect("pooled connection used after release")
    }
}

impl<T: Send + 'static> DerefMut for PooledConnection<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.conn.as_mut().expect("pooled connection used after release")
    }
}

impl<T: Send + 'static> Drop for PooledConnection<T> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.shared.push_idle(conn);
        }
    }
}

impl<T: Send + 'static> std::fmt::Debug for PooledConnection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::atomic::{AtomicBool, AtomicU64};

    use super::*;

    #[derive(Debug)]
    pub struct MockConn {
        pub id: u64,
        pub open: Arc<AtomicBool>,
    }

    #[derive(Default)]
    pub struct MockConnector {
        opened: AtomicU64,
        checks: AtomicU64,
        should_fail: AtomicBool,
        fail_attempts: Mutex<Vec<u64>>,
        check_delay: Mutex<Option<Duration>>,
        open_delay: Mutex<Option<Duration>>,
    }

    impl MockConnector {
        pub fn failing_on(attempts: &[u64]) -> Self {
            Self {
                fail_attempts: Mutex::new(attempts.to_vec()),
                ..Default::default()
            }
        }

        pub fn opened(&self) -> u64 {
            self.opened.load(Ordering::SeqCst)
        }

        pub fn checks(&self) -> u64 {
            self.checks.load(Ordering::SeqCst)
        }

        pub fn set_failing(&self, fail: bool) {
            self.should_fail.store(fail, Ordering::SeqCst);
        }

        pub fn set_check_delay(&self, delay: Duration) {
            *self.check_delay.lock() = Some(delay);
        }

        pub fn set_open_delay(&self, delay: Duration) {
            *self.open_delay.lock() = Some(delay);
        }
    }

    #[async_trait]
    impl Connector for MockConnector {
        type Connection = MockConn;

        async fn open(&self) -> DatabaseResult<MockConn> {
            let delay = *self.open_delay.lock();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let attempt = self.opened.fetch_add(1, Ordering::SeqCst);
            if self.should_fail.load(Ordering::SeqCst) || self.fail_attempts.lock().contains(&attempt) {
                let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
                return Err(DatabaseError::ConnectionFailure(sqlx::Error::Io(io)));
            }
            Ok(MockConn {
                id: attempt,
                open: Arc::new(AtomicBool::new(true)),
            })
        }

        async fn is_open(&self, conn: &mut MockConn) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst);
            let delay = *self.check_delay.lock();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            conn.open.load(Ordering::SeqCst)
        }
    }

    async fn make_pool(capacity: usize) -> ConnectionPool<MockConnector> {
        let pool = ConnectionPool::new(MockConnector::default(), capacity);
        pool.initialize().await;
        pool
    }

    #[tokio::test]
    async fn acquire_fails_after_capacity_checkouts() {
        let pool = make_pool(3).await;

        let mut held = Vec::new();
        for _ in 0..3 {
            held.push(pool.acquire().await.unwrap());
        }

        let result = pool.acquire().await;
        assert!(matches!(result, Err(DatabaseError::PoolExhausted)));
        assert_eq!(pool.live_count(), 3);
    }

    #[tokio::test]
    async fn release_restores_capacity() {
        let pool = make_pool(2).await;

        for _ in 0..3 {
            let conn = pool.acquire().await.unwrap();
            pool.release(conn);
        }
        assert_eq!(pool.idle_count(), 2);
        assert_eq!(pool.connector().opened(), 2); // reused, never reopened
    }

    #[tokio::test]
    async fn release_one_of_two_allows_next_acquire() {
        let pool = make_pool(2).await;

        let h1 = pool.acquire().await.unwrap();
        let _h2 = pool.acquire().await.unwrap();
        assert!(matches!(pool.acquire().await, Err(DatabaseError::PoolExhausted)));

        pool.release(h1);
        assert!(pool.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn dropping_handle_returns_it() {
        let pool = make_pool(1).await;
        {
            let _conn = pool.acquire().await.unwrap();
            assert_eq!(pool.idle_count(), 0);
        }
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn initialize_skips_failed_slots() {
        let pool = ConnectionPool::new(MockConnector::failing_on(&[1]), 3);
        assert_eq!(pool.initialize().await, 2);
        assert_eq!(pool.idle_count(), 2);

        let _a = pool.acquire().await.unwrap();
        let _b = pool.acquire().await.unwrap();
        assert!(matches!(pool.acquire().await, Err(DatabaseError::PoolExhausted)));
    }

    #[tokio::test]
    async fn initialize_never_exceeds_capacity() {
        let pool = make_pool(2).await;
        let _held = pool.acquire().await.unwrap();

        assert_eq!(pool.initialize().await, 0);
        assert_eq!(pool.live_count(), 2);
    }

    #[tokio::test]
    async fn closed_connection_is_replaced_on_acquire() {
        let pool = make_pool(1).await;

        let conn = pool.acquire().await.unwrap();
        let first_id = conn.id;
        conn.open.store(false, Ordering::SeqCst);
        pool.release(conn);
        assert_eq!(pool.idle_count(), 1); // broken handle sits idle

        let conn = pool.acquire().await.unwrap();
        assert_ne!(conn.id, first_id);
        assert_eq!(pool.connector().opened(), 2);
        assert_eq!(pool.live_count(), 1);
    }

    #[tokio::test]
    async fn failed_replacement_propagates() {
        let pool = make_pool(1).await;

        let conn = pool.acquire().await.unwrap();
        conn.open.store(false, Ordering::SeqCst);
        pool.release(conn);
        pool.connector().set_failing(true);

        let result = pool.acquire().await;
        assert!(matches!(result, Err(DatabaseError::ConnectionFailure(_))));
        assert_eq!(pool.live_count(), 0);
        assert!(matches!(pool.acquire().await, Err(DatabaseError::PoolExhausted)));
    }

    #[tokio::test]
    async fn drain_empties_idle_set() {
        let pool = make_pool(3).await;
        let held = pool.acquire().await.unwrap();

        assert_eq!(pool.drain().await, 2);
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.live_count(), 1);
        drop(held);
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn cancelled_check_keeps_connection() {
        let pool = make_pool(1).await;
        pool.connector().set_check_delay(Duration::from_millis(50));

        let cancelled = tokio::time::timeout(Duration::from_millis(5), pool.acquire()).await;
        assert!(cancelled.is_err());
        assert_eq!(pool.idle_count(), 1);
        assert_eq!(pool.live_count(), 1);

        pool.connector().set_check_delay(Duration::ZERO);
        let conn = pool.acquire().await.unwrap();
        assert_eq!(conn.id, 0); // same connection, not reopened
        assert_eq!(pool.connector().opened(), 1);
    }

    #[tokio::test]
    async fn cancelled_replacement_frees_slot() {
        let pool = make_pool(1).await;

        let conn = pool.acquire().await.unwrap();
        conn.open.store(false, Ordering::SeqCst);
        pool.release(conn);
        pool.connector().set_open_delay(Duration::from_millis(50));

        let cancelled = tokio::time::timeout(Duration::from_millis(5), pool.acquire()).await;
        assert!(cancelled.is_err());
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.live_count(), 0);

        pool.connector().set_open_delay(Duration::ZERO);
        assert_eq!(pool.initialize().await, 1);
        assert!(pool.acquire().await.is_ok());
    }

    #[tokio::test]
    async fn recently_idle_connection_skips_check() {
        let pool = ConnectionPool::new(MockConnector::default(), 1)
            .with_check_after(Duration::from_secs(60));
        pool.initialize().await;

        for _ in 0..3 {
            let conn = pool.acquire().await.unwrap();
            pool.release(conn);
        }
        assert_eq!(pool.connector().checks(), 0);

        let pool = make_pool(1).await;
        for _ in 0..3 {
            let conn = pool.acquire().await.unwrap();
            pool.release(conn);
        }
        assert_eq!(pool.connector().checks(), 3);
    }

    #[tokio::test]
    async fn concurrent_checkouts_stay_bounded() {
        let pool = Arc::new(make_pool(4).await);
        let mut tasks = Vec::new();

        for _ in 0..16 {
            let pool = Arc::clone(&pool);
            tasks.push(tokio::spawn(async move {
                match pool.acquire().await {
                    Ok(conn) => {
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                        pool.release(conn);
                        true
                    }
                    Err(DatabaseError::PoolExhausted) => false,
                    Err(e) => panic!("unexpected error: {e}"),
                }
            }));
        }

        let mut served = 0;
        for task in tasks {
            if task.await.unwrap() {
                served += 1;
            }
        }

        assert!(served >= 4);
        assert_eq!(pool.idle_count(), 4);
        assert_eq!(pool.live_count(), 4);
        assert_eq!(pool.connector().opened(), 4);
    }
}
