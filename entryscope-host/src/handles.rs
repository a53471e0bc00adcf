//! Opaque identifiers handed out by the host.
//!
//! None of these are owned by the probe. They are only valid inside the
//! callback that supplied them and must never be cached across events.

use std::num::NonZeroUsize;

macro_rules! host_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub usize);

        impl $name {
            pub fn from_raw<T>(ptr: *mut T) -> Self {
                Self(ptr as usize)
            }

            pub fn as_raw<T>(self) -> *mut T {
                self.0 as *mut T
            }
        }
    };
}

host_handle!(
    /// Method identifier (`jmethodID` for the JVM)
    MethodHandle
);
host_handle!(
    /// Thread reference valid for the current callback
    ThreadHandle
);
host_handle!(
    /// Class reference returned by a declaring-class lookup
    ClassHandle
);

/// Identity of a buffer the host allocated and handed to the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(NonZeroUsize);

impl BufferId {
    /// `None` for a null address: there is nothing to release
    pub fn new(addr: usize) -> Option<Self> {
        NonZeroUsize::new(addr).map(Self)
    }

    pub fn from_ptr<T>(ptr: *mut T) -> Option<Self> {
        Self::new(ptr as usize)
    }

    pub fn addr(self) -> usize {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_id_null() {
        assert!(BufferId::new(0).is_none());
        assert!(BufferId::from_ptr(std::ptr::null_mut::<u8>()).is_none());
        assert_eq!(BufferId::new(0x1000).map(BufferId::addr), Some(0x1000));
    }

    #[test]
    fn test_handle_round_trip_pointer() {
        let method = MethodHandle(0xdead_0000);
        let raw: *mut u8 = method.as_raw();
        assert_eq!(MethodHandle::from_raw(raw), method);
    }
}
