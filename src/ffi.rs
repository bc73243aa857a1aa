use crate::{Storage, StorageError};
use std::ffi::{c_void, CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

pub const STORAGE_OK: c_int = 0;
pub const STORAGE_CAPACITY_EXCEEDED: c_int = 1;
pub const STORAGE_INVALID_ARGUMENT: c_int = -1;

type StringStorage = Storage<String, String>;

// Borrow a UTF-8 string from a C pointer
unsafe fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

fn into_c_string(value: String) -> *mut c_char {
    match CString::new(value) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Returns a new storage handle, or null if the capacities are invalid.
#[no_mangle]
pub extern "C" fn storage_create(capacity: usize, cache_capacity: usize) -> *mut c_void {
    match StringStorage::new(capacity, cache_capacity) {
        Ok(storage) => Box::into_raw(Box::new(storage)) as *mut c_void,
        Err(_) => ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn storage_destroy(ptr: *mut c_void) {
    if !ptr.is_null() {
        unsafe {
            let _ = Box::from_raw(ptr as *mut StringStorage);
        }
    }
}

#[no_mangle]
pub extern "C" fn storage_store(
    ptr: *mut c_void,
    key: *const c_char,
    value: *const c_char,
) -> c_int {
    if ptr.is_null() {
        return STORAGE_INVALID_ARGUMENT;
    }

    unsafe {
        let storage = &*(ptr as *const StringStorage);
        let (key_str, value_str) = match (read_str(key), read_str(value)) {
            (Some(k), Some(v)) => (k, v),
            _ => return STORAGE_INVALID_ARGUMENT,
        };

        match storage.store(key_str.to_string(), value_str.to_string()) {
            Ok(()) => STORAGE_OK,
            Err(StorageError::CapacityExceeded { .. }) => STORAGE_CAPACITY_EXCEEDED,
            Err(_) => STORAGE_INVALID_ARGUMENT,
        }
    }
}

/// Returns an owned copy of the value, or null if absent. Release it with
/// `storage_free_string`.
#[no_mangle]
pub extern "C" fn storage_load(ptr: *mut c_void, key: *const c_char) -> *mut c_char {
    if ptr.is_null() {
        return ptr::null_mut();
    }

    unsafe {
        let storage = &*(ptr as *const StringStorage);
        let key_str = match read_str(key) {
            Some(s) => s,
            None => return ptr::null_mut(),
        };

        match storage.load(&key_str.to_string()) {
            Ok(value) => into_c_string(value),
            Err(_) => ptr::null_mut(),
        }
    }
}

/// Removes the key and returns its value, or null if absent. Release it with
/// `storage_free_string`.
#[no_mangle]
pub extern "C" fn storage_remove(ptr: *mut c_void, key: *const c_char) -> *mut c_char {
    if ptr.is_null() {
        return ptr::null_mut();
    }

    unsafe {
        let storage = &*(ptr as *const StringStorage);
        let key_str = match read_str(key) {
            Some(s) => s,
            None => return ptr::null_mut(),
        };

        match storage.remove(&key_str.to_string()) {
            Ok(value) => into_c_string(value),
            Err(_) => ptr::null_mut(),
        }
    }
}

#[no_mangle]
pub extern "C" fn storage_contains(ptr: *mut c_void, key: *const c_char) -> c_int {
    if ptr.is_null() {
        return 0;
    }

    unsafe {
        let storage = &*(ptr as *const StringStorage);
        match read_str(key) {
            Some(key_str) => storage.contains(&key_str.to_string()) as c_int,
            None => 0,
        }
    }
}

#[no_mangle]
pub extern "C" fn storage_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}

#[no_mangle]
pub extern "C" fn storage_len(ptr: *mut c_void) -> usize {
    if ptr.is_null() {
        return 0;
    }
    unsafe {
        let storage = &*(ptr as *const StringStorage);
        storage.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(value: &str) -> CString {
        CString::new(value).unwrap()
    }

    fn take_string(ptr: *mut c_char) -> Option<String> {
        if ptr.is_null() {
            return None;
        }
        let value = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        storage_free_string(ptr);
        Some(value)
    }

    #[test]
    fn test_create_rejects_invalid_capacities() {
        assert!(storage_create(10, 10).is_null());
        assert!(storage_create(10, 0).is_null());
    }

    #[test]
    fn test_round_trip() {
        let handle = storage_create(2, 1);
        assert!(!handle.is_null());

        let (cat, meow) = (c("cat"), c("meow"));
        assert_eq!(storage_store(handle, cat.as_ptr(), meow.as_ptr()), STORAGE_OK);
        assert_eq!(storage_contains(handle, cat.as_ptr()), 1);
        assert_eq!(take_string(storage_load(handle, cat.as_ptr())), Some("meow".to_string()));

        let (dog, bird) = (c("dog"), c("bird"));
        assert_eq!(storage_store(handle, dog.as_ptr(), meow.as_ptr()), STORAGE_OK);
        assert_eq!(
            storage_store(handle, bird.as_ptr(), meow.as_ptr()),
            STORAGE_CAPACITY_EXCEEDED
        );
        assert_eq!(storage_len(handle), 2);

        assert_eq!(take_string(storage_remove(handle, cat.as_ptr())), Some("meow".to_string()));
        assert_eq!(storage_contains(handle, cat.as_ptr()), 0);
        assert!(storage_load(handle, cat.as_ptr()).is_null());
        assert!(storage_remove(handle, cat.as_ptr()).is_null());

        storage_destroy(handle);
    }

    #[test]
    fn test_null_arguments() {
        let handle = storage_create(4, 2);
        let key = c("key");

        assert_eq!(
            storage_store(ptr::null_mut(), key.as_ptr(), key.as_ptr()),
            STORAGE_INVALID_ARGUMENT
        );
        assert_eq!(
            storage_store(handle, key.as_ptr(), ptr::null()),
            STORAGE_INVALID_ARGUMENT
        );
        assert!(storage_load(handle, ptr::null()).is_null());
        assert_eq!(storage_contains(ptr::null_mut(), key.as_ptr()), 0);
        assert_eq!(storage_len(ptr::null_mut()), 0);

        storage_free_string(ptr::null_mut());
        storage_destroy(ptr::null_mut());
        storage_destroy(handle);
    }
}
