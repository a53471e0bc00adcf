//! `extern "system"` trampolines the VM calls, forwarding to the installed sink.

use std::sync::OnceLock;

use super::host::JvmtiHost;
use super::sys::{jmethodID, jthread, jvmtiEnv, JNIEnv};
use crate::env::{EventSink, HostEvent};
use crate::error::{HostError, Result};
use crate::handles::{MethodHandle, ThreadHandle};

static SINK: OnceLock<&'static dyn EventSink> = OnceLock::new();

/// Install the process-wide sink. Must happen before any event is bound.
pub fn install_event_sink(sink: &'static dyn EventSink) -> Result<()> {
    SINK.set(sink).map_err(|_| HostError::SinkAlreadyInstalled)
}

fn forward(jvmti_env: *mut jvmtiEnv, event: HostEvent) {
    let Some(sink) = SINK.get() else {
        return;
    };
    if jvmti_env.is_null() {
        return;
    }
    // SAFETY: the VM hands every callback the environment it was registered on
    let host = unsafe { JvmtiHost::from_raw(jvmti_env) };
    sink.deliver(&host, event);
}

pub(crate) unsafe extern "system" fn on_vm_init(
    jvmti_env: *mut jvmtiEnv,
    _jni_env: *mut JNIEnv,
    thread: jthread,
) {
    forward(
        jvmti_env,
        HostEvent::VmInit {
            thread: ThreadHandle::from_raw(thread),
        },
    );
}

pub(crate) unsafe extern "system" fn on_vm_death(jvmti_env: *mut jvmtiEnv, _jni_env: *mut JNIEnv) {
    forward(jvmti_env, HostEvent::VmDeath);
}

pub(crate) unsafe extern "system" fn on_method_entry(
    jvmti_env: *mut jvmtiEnv,
    _jni_env: *mut JNIEnv,
    thread: jthread,
    method: jmethodID,
) {
    forward(
        jvmti_env,
        HostEvent::MethodEntry {
            method: MethodHandle::from_raw(method),
            thread: ThreadHandle::from_raw(thread),
        },
    );
}
