use std::ffi::CStr;
use std::os::raw::{c_char, c_void};
use std::ptr;
use std::sync::Mutex;

use super::callbacks;
use super::sys::{self, jvmtiCapabilities, jvmtiEnv, jvmtiEventCallbacks, JavaVM};
use crate::allocation::{LocalVariableEntry, LocalVariableTable, Scoped};
use crate::capabilities::CapabilitySet;
use crate::env::{EventKind, FrameLocation, HostEnv};
use crate::error::{HostError, HostResult, HostStatus, Result};
use crate::handles::{BufferId, ClassHandle, MethodHandle, ThreadHandle};
use tracing::debug;

/// `HostEnv` over a live JVMTI environment
pub struct JvmtiHost {
    env: *mut jvmtiEnv,
    // Callback slots bound so far; the host copies the whole struct on each bind.
    callbacks: Mutex<jvmtiEventCallbacks>,
}

// JVMTI environments may be used from any thread.
unsafe impl Send for JvmtiHost {}
unsafe impl Sync for JvmtiHost {}

impl JvmtiHost {
    /// Obtain a JVMTI 1.0 environment from the VM
    ///
    /// # Safety
    /// `vm` must be the pointer the VM passed to `Agent_OnLoad`.
    pub unsafe fn from_vm(vm: *mut JavaVM) -> Result<Self> {
        if vm.is_null() || (*vm).is_null() {
            return Err(HostError::EnvUnavailable(sys::JNI_ERR));
        }
        let get_env = (**vm).GetEnv.ok_or(HostError::EnvUnavailable(sys::JNI_ERR))?;

        let mut env: *mut c_void = ptr::null_mut();
        let res = get_env(vm, &mut env, sys::JVMTI_VERSION_1_0);
        if res != sys::JNI_OK || env.is_null() {
            return Err(HostError::EnvUnavailable(res));
        }

        debug!("Obtained JVMTI environment at {:p}", env);
        Ok(Self::from_raw(env as *mut jvmtiEnv))
    }

    /// Wrap an environment pointer delivered to an event callback
    ///
    /// # Safety
    /// `env` must be a valid JVMTI environment for as long as the value lives.
    pub unsafe fn from_raw(env: *mut jvmtiEnv) -> Self {
        Self {
            env,
            callbacks: Mutex::new(jvmtiEventCallbacks::default()),
        }
    }

    fn functions(&self) -> &sys::jvmtiInterface_1_ {
        // SAFETY: env is a valid environment by construction
        unsafe { &**self.env }
    }

    /// Copy a host string out and take ownership of its buffer
    fn take_string(&self, ptr: *mut c_char) -> Scoped<'_, String> {
        if ptr.is_null() {
            return Scoped::unowned(self, String::new());
        }
        // Modified UTF-8 decodes lossily for supplementary characters
        let value = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
        Scoped::new(self, value, BufferId::from_ptr(ptr))
    }

    fn take_optional_string(&self, ptr: *mut c_char) -> Scoped<'_, Option<String>> {
        if ptr.is_null() {
            return Scoped::unowned(self, None);
        }
        let value = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
        Scoped::new(self, Some(value), BufferId::from_ptr(ptr))
    }
}

fn status(raw: sys::jvmtiError) -> HostResult<()> {
    HostStatus(raw).into_result()
}

fn event_number(kind: EventKind) -> sys::jvmtiEvent {
    match kind {
        EventKind::MethodEntry => sys::JVMTI_EVENT_METHOD_ENTRY,
        EventKind::VmInit => sys::JVMTI_EVENT_VM_INIT,
        EventKind::VmDeath => sys::JVMTI_EVENT_VM_DEATH,
    }
}

impl HostEnv for JvmtiHost {
    fn interface_name(&self) -> &str {
        "JVMTI"
    }

    fn runtime_name(&self) -> &str {
        "JVM"
    }

    fn error_name(&self, error: HostStatus) -> HostResult<Scoped<'_, String>> {
        let get_error_name = self.functions().GetErrorName.ok_or(HostStatus::NOT_AVAILABLE)?;
        let mut name: *mut c_char = ptr::null_mut();
        status(unsafe { get_error_name(self.env, error.code(), &mut name) })?;
        Ok(self.take_string(name))
    }

    fn add_capabilities(&self, capabilities: &CapabilitySet) -> HostResult<()> {
        let add = self.functions().AddCapabilities.ok_or(HostStatus::NOT_AVAILABLE)?;
        let mut caps = jvmtiCapabilities::default();
        caps.set(
            jvmtiCapabilities::CAN_ACCESS_LOCAL_VARIABLES,
            capabilities.can_access_local_variables,
        );
        caps.set(
            jvmtiCapabilities::CAN_GENERATE_METHOD_ENTRY_EVENTS,
            capabilities.can_generate_method_entry_events,
        );
        status(unsafe { add(self.env, &caps) })
    }

    fn bind_event(&self, kind: EventKind) -> HostResult<()> {
        let set_callbacks = self.functions().SetEventCallbacks.ok_or(HostStatus::NOT_AVAILABLE)?;
        let mut bound = self
            .callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut next = *bound;
        match kind {
            EventKind::MethodEntry => next.MethodEntry = Some(callbacks::on_method_entry),
            EventKind::VmInit => next.VMInit = Some(callbacks::on_vm_init),
            EventKind::VmDeath => next.VMDeath = Some(callbacks::on_vm_death),
        }

        let size = std::mem::size_of::<jvmtiEventCallbacks>() as sys::jint;
        status(unsafe { set_callbacks(self.env, &next, size) })?;
        *bound = next;
        Ok(())
    }

    fn set_event_enabled(&self, kind: EventKind, enabled: bool) -> HostResult<()> {
        let set_mode = self
            .functions()
            .SetEventNotificationMode
            .ok_or(HostStatus::NOT_AVAILABLE)?;
        let mode = if enabled { sys::JVMTI_ENABLE } else { sys::JVMTI_DISABLE };
        // A null thread applies the mode globally
        status(unsafe { set_mode(self.env, mode, event_number(kind), ptr::null_mut()) })
    }

    fn method_declaring_class(&self, method: MethodHandle) -> HostResult<ClassHandle> {
        let get_class = self
            .functions()
            .GetMethodDeclaringClass
            .ok_or(HostStatus::NOT_AVAILABLE)?;
        let mut class: sys::jclass = ptr::null_mut();
        status(unsafe { get_class(self.env, method.as_raw(), &mut class) })?;
        Ok(ClassHandle::from_raw(class))
    }

    fn class_signature(&self, class: ClassHandle) -> HostResult<Scoped<'_, String>> {
        let get_signature = self.functions().GetClassSignature.ok_or(HostStatus::NOT_AVAILABLE)?;
        let mut signature: *mut c_char = ptr::null_mut();
        status(unsafe { get_signature(self.env, class.as_raw(), &mut signature, ptr::null_mut()) })?;
        Ok(self.take_string(signature))
    }

    fn method_name(&self, method: MethodHandle) -> HostResult<Scoped<'_, String>> {
        let get_name = self.functions().GetMethodName.ok_or(HostStatus::NOT_AVAILABLE)?;
        let mut name: *mut c_char = ptr::null_mut();
        status(unsafe {
            get_name(
                self.env,
                method.as_raw(),
                &mut name,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        })?;
        Ok(self.take_string(name))
    }

    fn arguments_size(&self, method: MethodHandle) -> HostResult<i32> {
        let get_size = self.functions().GetArgumentsSize.ok_or(HostStatus::NOT_AVAILABLE)?;
        let mut size: sys::jint = 0;
        status(unsafe { get_size(self.env, method.as_raw(), &mut size) })?;
        Ok(size)
    }

    fn local_variable_table(&self, method: MethodHandle) -> HostResult<LocalVariableTable<'_>> {
        let get_table = self
            .functions()
            .GetLocalVariableTable
            .ok_or(HostStatus::NOT_AVAILABLE)?;
        let mut count: sys::jint = 0;
        let mut table: *mut sys::jvmtiLocalVariableEntry = ptr::null_mut();
        status(unsafe { get_table(self.env, method.as_raw(), &mut count, &mut table) })?;

        let raw_entries: &[sys::jvmtiLocalVariableEntry] = if table.is_null() || count <= 0 {
            &[]
        } else {
            // SAFETY: the host returned `count` contiguous entries at `table`
            unsafe { std::slice::from_raw_parts(table, count as usize) }
        };

        let entries = raw_entries
            .iter()
            .map(|raw| LocalVariableEntry {
                start_location: raw.start_location,
                length: raw.length,
                slot: raw.slot,
                name: self.take_string(raw.name),
                signature: self.take_string(raw.signature),
                generic_signature: self.take_optional_string(raw.generic_signature),
            })
            .collect();

        Ok(LocalVariableTable::new(self, entries, BufferId::from_ptr(table)))
    }

    fn frame_location(&self, thread: ThreadHandle, depth: i32) -> HostResult<FrameLocation> {
        let get_location = self.functions().GetFrameLocation.ok_or(HostStatus::NOT_AVAILABLE)?;
        let mut method: sys::jmethodID = ptr::null_mut();
        let mut location: sys::jlocation = 0;
        status(unsafe { get_location(self.env, thread.as_raw(), depth, &mut method, &mut location) })?;
        Ok(FrameLocation {
            method: MethodHandle::from_raw(method),
            location,
        })
    }

    fn deallocate(&self, buffer: BufferId) -> HostResult<()> {
        let dealloc = self.functions().Deallocate.ok_or(HostStatus::NOT_AVAILABLE)?;
        status(unsafe { dealloc(self.env, buffer.addr() as *mut u8) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vm_rejects_null() {
        let err = unsafe { JvmtiHost::from_vm(ptr::null_mut()) }.err();
        assert!(matches!(err, Some(HostError::EnvUnavailable(sys::JNI_ERR))));
    }

    #[test]
    fn test_event_numbers() {
        assert_eq!(event_number(EventKind::VmInit), 50);
        assert_eq!(event_number(EventKind::VmDeath), 51);
        assert_eq!(event_number(EventKind::MethodEntry), 65);
    }
}
