//! Raw JNI/JVMTI declarations, limited to the slots the probe calls.
//!
//! Function tables are declared in full width with opaque padding between the
//! used slots, so every field sits at the offset `jvmti.h` gives it.

#![allow(non_camel_case_types, non_snake_case)]

use std::os::raw::{c_char, c_uchar, c_void};

pub type jint = i32;
pub type jlong = i64;
pub type jlocation = jlong;
pub type jobject = *mut c_void;
pub type jthread = jobject;
pub type jclass = jobject;
pub type jmethodID = *mut c_void;
pub type JNIEnv = c_void;

/// Raw status; kept numeric so unknown codes from newer VMs stay representable
pub type jvmtiError = u32;
pub type jvmtiEvent = u32;

pub const JNI_OK: jint = 0;
pub const JNI_ERR: jint = -1;
pub const JVMTI_VERSION_1_0: jint = 0x3001_0000;

pub const JVMTI_ENABLE: jint = 1;
pub const JVMTI_DISABLE: jint = 0;

pub const JVMTI_EVENT_VM_INIT: jvmtiEvent = 50;
pub const JVMTI_EVENT_VM_DEATH: jvmtiEvent = 51;
pub const JVMTI_EVENT_METHOD_ENTRY: jvmtiEvent = 65;

pub const JVMTI_ERROR_NONE: jvmtiError = 0;

// ----- JNI invoke interface -----

pub type JavaVM = *const JNIInvokeInterface_;

#[repr(C)]
pub struct JNIInvokeInterface_ {
    pub reserved0: *mut c_void,
    pub reserved1: *mut c_void,
    pub reserved2: *mut c_void,
    pub DestroyJavaVM: Option<unsafe extern "system" fn(vm: *mut JavaVM) -> jint>,
    pub AttachCurrentThread: Option<
        unsafe extern "system" fn(vm: *mut JavaVM, penv: *mut *mut c_void, args: *mut c_void) -> jint,
    >,
    pub DetachCurrentThread: Option<unsafe extern "system" fn(vm: *mut JavaVM) -> jint>,
    pub GetEnv: Option<
        unsafe extern "system" fn(vm: *mut JavaVM, penv: *mut *mut c_void, version: jint) -> jint,
    >,
    pub AttachCurrentThreadAsDaemon: Option<
        unsafe extern "system" fn(vm: *mut JavaVM, penv: *mut *mut c_void, args: *mut c_void) -> jint,
    >,
}

// ----- JVMTI function table -----

pub type jvmtiEnv = *const jvmtiInterface_1_;

type Unused = *const c_void;

/// `jvmtiInterface_1_`, 1-based slot numbers in comments
#[repr(C)]
pub struct jvmtiInterface_1_ {
    /* 1 */ pub reserved1: Unused,
    /* 2 */
    pub SetEventNotificationMode: Option<
        unsafe extern "C" fn(env: *mut jvmtiEnv, mode: jint, event_type: jvmtiEvent, event_thread: jthread, ...) -> jvmtiError,
    >,
    /* 3-18 */ _pad_3: [Unused; 16],
    /* 19 */
    pub GetFrameLocation: Option<
        unsafe extern "system" fn(
            env: *mut jvmtiEnv,
            thread: jthread,
            depth: jint,
            method_ptr: *mut jmethodID,
            location_ptr: *mut jlocation,
        ) -> jvmtiError,
    >,
    /* 20-46 */ _pad_20: [Unused; 27],
    /* 47 */
    pub Deallocate: Option<unsafe extern "system" fn(env: *mut jvmtiEnv, mem: *mut c_uchar) -> jvmtiError>,
    /* 48 */
    pub GetClassSignature: Option<
        unsafe extern "system" fn(
            env: *mut jvmtiEnv,
            klass: jclass,
            signature_ptr: *mut *mut c_char,
            generic_ptr: *mut *mut c_char,
        ) -> jvmtiError,
    >,
    /* 49-63 */ _pad_49: [Unused; 15],
    /* 64 */
    pub GetMethodName: Option<
        unsafe extern "system" fn(
            env: *mut jvmtiEnv,
            method: jmethodID,
            name_ptr: *mut *mut c_char,
            signature_ptr: *mut *mut c_char,
            generic_ptr: *mut *mut c_char,
        ) -> jvmtiError,
    >,
    /* 65 */
    pub GetMethodDeclaringClass: Option<
        unsafe extern "system" fn(env: *mut jvmtiEnv, method: jmethodID, declaring_class_ptr: *mut jclass) -> jvmtiError,
    >,
    /* 66-68 */ _pad_66: [Unused; 3],
    /* 69 */
    pub GetArgumentsSize: Option<
        unsafe extern "system" fn(env: *mut jvmtiEnv, method: jmethodID, size_ptr: *mut jint) -> jvmtiError,
    >,
    /* 70-71 */ _pad_70: [Unused; 2],
    /* 72 */
    pub GetLocalVariableTable: Option<
        unsafe extern "system" fn(
            env: *mut jvmtiEnv,
            method: jmethodID,
            entry_count_ptr: *mut jint,
            table_ptr: *mut *mut jvmtiLocalVariableEntry,
        ) -> jvmtiError,
    >,
    /* 73-121 */ _pad_73: [Unused; 49],
    /* 122 */
    pub SetEventCallbacks: Option<
        unsafe extern "system" fn(
            env: *mut jvmtiEnv,
            callbacks: *const jvmtiEventCallbacks,
            size_of_callbacks: jint,
        ) -> jvmtiError,
    >,
    /* 123-127 */ _pad_123: [Unused; 5],
    /* 128 */
    pub GetErrorName: Option<
        unsafe extern "system" fn(env: *mut jvmtiEnv, error: jvmtiError, name_ptr: *mut *mut c_char) -> jvmtiError,
    >,
    /* 129-141 */ _pad_129: [Unused; 13],
    /* 142 */
    pub AddCapabilities: Option<
        unsafe extern "system" fn(env: *mut jvmtiEnv, capabilities_ptr: *const jvmtiCapabilities) -> jvmtiError,
    >,
}

// ----- data structures -----

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct jvmtiLocalVariableEntry {
    pub start_location: jlocation,
    pub length: jint,
    pub name: *mut c_char,
    pub signature: *mut c_char,
    pub generic_signature: *mut c_char,
    pub slot: jint,
}

/// The C bitfield struct, viewed as four little-endian words
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct jvmtiCapabilities {
    pub bits: [u32; 4],
}

impl jvmtiCapabilities {
    pub const CAN_ACCESS_LOCAL_VARIABLES: usize = 14;
    pub const CAN_GENERATE_METHOD_ENTRY_EVENTS: usize = 24;

    pub fn set(&mut self, bit: usize, on: bool) {
        let mask = 1u32 << (bit % 32);
        if on {
            self.bits[bit / 32] |= mask;
        } else {
            self.bits[bit / 32] &= !mask;
        }
    }

    pub fn get(&self, bit: usize) -> bool {
        self.bits[bit / 32] & (1u32 << (bit % 32)) != 0
    }
}

// ----- event callbacks -----

pub type VMInitFn = unsafe extern "system" fn(jvmti_env: *mut jvmtiEnv, jni_env: *mut JNIEnv, thread: jthread);
pub type VMDeathFn = unsafe extern "system" fn(jvmti_env: *mut jvmtiEnv, jni_env: *mut JNIEnv);
pub type MethodEntryFn =
    unsafe extern "system" fn(jvmti_env: *mut jvmtiEnv, jni_env: *mut JNIEnv, thread: jthread, method: jmethodID);

type ReservedCallback = Option<unsafe extern "system" fn()>;

/// `jvmtiEventCallbacks`; entry `n` handles event `50 + n`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct jvmtiEventCallbacks {
    pub VMInit: Option<VMInitFn>,
    pub VMDeath: Option<VMDeathFn>,
    /// ThreadStart through Breakpoint and the field watch events (52-64)
    _events_52: [ReservedCallback; 13],
    pub MethodEntry: Option<MethodEntryFn>,
    /// MethodExit onwards (66-88)
    _events_66: [ReservedCallback; 23],
}
