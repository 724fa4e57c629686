use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks `mutex`, recovering the guard if a previous holder panicked.
///
/// Inspector state is only touched from the frame callback. A panic inside a
/// user-invoked getter must not render the whole overlay unusable, so poison
/// is ignored and the last written state is used as-is.
///
/// # Examples
///
/// ```
/// use ri_os::sync::{Mutex, lock_unpoisoned};
///
/// let counter = Mutex::new(1);
/// *lock_unpoisoned(&counter) += 1;
/// assert_eq!(*lock_unpoisoned(&counter), 2);
/// ```
#[inline]
pub fn lock_unpoisoned<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::lock_unpoisoned;

    #[test]
    fn recovers_from_poison() {
        let shared = Arc::new(Mutex::new(5));
        let cloned = Arc::clone(&shared);
        let result = std::thread::spawn(move || {
            let _guard = cloned.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(result.is_err());
        assert!(shared.is_poisoned());
        assert_eq!(*lock_unpoisoned(&shared), 5);
    }
}
