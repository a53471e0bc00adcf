//! Ownership of host-allocated buffers.
//!
//! Strings and tables returned by introspection queries live in memory the
//! host allocated on the probe's behalf. The host hands ownership over with
//! the value: the probe must give every buffer back exactly once. `Scoped`
//! ties a copied-out value to its buffer and releases it on drop, so early
//! returns and error paths cannot leak or double-free.

use std::ops::Deref;

use crate::env::HostEnv;
use crate::error::HostResult;
use crate::handles::BufferId;
use entryscope_protocol::Location;
use tracing::warn;

/// A value copied out of a host buffer, bound to the host that must release it
pub struct Scoped<'env, T> {
    value: T,
    buffer: Option<BufferId>,
    env: &'env dyn HostEnv,
}

impl<'env, T> Scoped<'env, T> {
    /// Take ownership of `buffer`; `None` means the host allocated nothing
    pub fn new(env: &'env dyn HostEnv, value: T, buffer: Option<BufferId>) -> Self {
        Self { value, buffer, env }
    }

    /// A value with no backing host buffer
    pub fn unowned(env: &'env dyn HostEnv, value: T) -> Self {
        Self::new(env, value, None)
    }

    pub fn buffer(&self) -> Option<BufferId> {
        self.buffer
    }

    /// Release the buffer now and surface the host's answer.
    ///
    /// After this call the drop glue has nothing left to release.
    pub fn release(mut self) -> HostResult<()> {
        match self.buffer.take() {
            Some(buffer) => self.env.deallocate(buffer),
            None => Ok(()),
        }
    }

    /// Release the buffer and keep the copied value
    pub fn into_value(mut self) -> T
    where
        T: Default,
    {
        std::mem::take(&mut self.value)
    }
}

impl<T> Deref for Scoped<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> Drop for Scoped<'_, T> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            if let Err(status) = self.env.deallocate(buffer) {
                warn!(
                    "Failed to release host buffer 0x{:x}: {}",
                    buffer.addr(),
                    status
                );
            }
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Scoped<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scoped")
            .field("value", &self.value)
            .field("buffer", &self.buffer)
            .finish()
    }
}

/// One row of a method's local-variable debug table
#[derive(Debug)]
pub struct LocalVariableEntry<'env> {
    /// First location at which the variable is live
    pub start_location: Location,
    /// Length of the live range in locations
    pub length: i32,
    pub slot: i32,
    pub name: Scoped<'env, String>,
    pub signature: Scoped<'env, String>,
    pub generic_signature: Scoped<'env, Option<String>>,
}

/// A method's local-variable table together with the buffer holding it.
///
/// Dropping the table releases every entry's strings first, then the table
/// buffer itself.
#[derive(Debug)]
pub struct LocalVariableTable<'env> {
    // Field order is drop order: entry strings before the table buffer.
    entries: Vec<LocalVariableEntry<'env>>,
    table: Scoped<'env, ()>,
}

impl<'env> LocalVariableTable<'env> {
    pub fn new(
        env: &'env dyn HostEnv,
        entries: Vec<LocalVariableEntry<'env>>,
        table_buffer: Option<BufferId>,
    ) -> Self {
        Self {
            entries,
            table: Scoped::new(env, (), table_buffer),
        }
    }

    pub fn entries(&self) -> &[LocalVariableEntry<'env>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Release every buffer now, returning the status of the table release
    pub fn release(self) -> HostResult<()> {
        let Self { entries, table } = self;
        drop(entries);
        table.release()
    }
}
