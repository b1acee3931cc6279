use tokio::sync::Mutex as AsyncMutex;

/// Serializes tests that read or write process environment variables.
/// `.blocking_lock()` in sync tests, `.lock().await` in async ones.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());
