use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread::scope;

#[cfg(feature = "lock")]
use crate::LockResolver;
use crate::{
    AtomicResolver, Error, MAX_SEQUENCE, MAX_TRACKED_MILLIS, SequenceResolver, SharedResolver,
};

fn run_first_call_starts_at_zero<R: SequenceResolver>(resolver: &R) {
    assert_eq!(resolver.resolve(1), Ok(0));
}

fn run_sequence_increments_within_same_millis<R: SequenceResolver>(resolver: &R) {
    assert_eq!(resolver.resolve(1), Ok(0));
    assert_eq!(resolver.resolve(1), Ok(1));
    assert_eq!(resolver.resolve(2), Ok(0));
    assert_eq!(resolver.resolve(2), Ok(1));
    assert_eq!(resolver.resolve(2), Ok(2));
}

fn run_exhaustion_returns_sentinel<R: SequenceResolver>(resolver: &R) {
    for expected in 0..MAX_SEQUENCE {
        assert_eq!(resolver.resolve(42), Ok(expected));
    }

    // The counter reaches the sentinel value itself, then wraps.
    assert_eq!(resolver.resolve(42), Ok(MAX_SEQUENCE));
    for _ in 0..16 {
        assert_eq!(resolver.resolve(42), Ok(MAX_SEQUENCE));
    }

    assert_eq!(resolver.resolve(43), Ok(0));
}

fn run_clock_behind_returns_sentinel<R: SequenceResolver>(resolver: &R) {
    assert_eq!(resolver.resolve(100), Ok(MAX_SEQUENCE));
    assert_eq!(resolver.resolve(100), Ok(MAX_SEQUENCE));
    // Once the clock catches up the usual rules apply: the same millisecond
    // continues its sequence, a newer one starts over.
    assert_eq!(resolver.resolve(101), Ok(4));
    assert_eq!(resolver.resolve(102), Ok(0));
}

fn run_concurrent_callers_never_share_a_sequence<R>(resolver: &R)
where
    R: SequenceResolver + Sync,
{
    let threads = num_cpus::get().clamp(2, 16);
    let per_thread = (usize::from(MAX_SEQUENCE) + 1) * 2 / threads;
    let seen = Mutex::new(Vec::with_capacity(threads * per_thread));

    scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                let mut local = Vec::with_capacity(per_thread);
                for _ in 0..per_thread {
                    local.push(resolver.resolve(7).unwrap());
                }
                seen.lock().unwrap().extend(local);
            });
        }
    });

    let seen = seen.into_inner().unwrap();
    let usable: Vec<u16> = seen.iter().copied().filter(|s| *s < MAX_SEQUENCE).collect();
    let unique: HashSet<u16> = usable.iter().copied().collect();

    assert_eq!(usable.len(), unique.len(), "duplicate sequence issued");
    assert_eq!(unique.len(), usize::from(MAX_SEQUENCE));
}

#[test]
fn atomic_first_call_starts_at_zero() {
    run_first_call_starts_at_zero(&AtomicResolver::new());
}

#[test]
fn atomic_sequence_increments_within_same_millis() {
    run_sequence_increments_within_same_millis(&AtomicResolver::new());
}

#[test]
fn atomic_exhaustion_returns_sentinel() {
    run_exhaustion_returns_sentinel(&AtomicResolver::new());
}

#[test]
fn atomic_clock_behind_returns_sentinel() {
    run_clock_behind_returns_sentinel(&AtomicResolver::from_state(101, 3));
}

#[test]
fn atomic_concurrent_callers_never_share_a_sequence() {
    run_concurrent_callers_never_share_a_sequence(&AtomicResolver::new());
}

#[test]
fn atomic_state_is_published_as_one_word() {
    let resolver = AtomicResolver::new();
    resolver.resolve(1_700_000_000_000).unwrap();
    resolver.resolve(1_700_000_000_000).unwrap();
    assert_eq!(resolver.state(), (1_700_000_000_000, 1));
}

#[test]
fn atomic_rejects_millis_outside_window() {
    let resolver = AtomicResolver::new();
    assert_eq!(
        resolver.resolve(-1),
        Err(Error::ClockOutOfRange { millis: -1 })
    );
    assert_eq!(
        resolver.resolve(MAX_TRACKED_MILLIS + 1),
        Err(Error::ClockOutOfRange {
            millis: MAX_TRACKED_MILLIS + 1
        })
    );
    assert_eq!(resolver.resolve(MAX_TRACKED_MILLIS), Ok(0));
    assert_eq!(resolver.state(), (MAX_TRACKED_MILLIS, 0));
}

#[test]
fn atomic_resolver_can_back_a_static() {
    static RESOLVER: AtomicResolver = AtomicResolver::new();
    assert_eq!(RESOLVER.resolve(5), Ok(0));
    assert_eq!(RESOLVER.resolve(5), Ok(1));
}

#[cfg(feature = "lock")]
#[test]
fn lock_first_call_starts_at_zero() {
    run_first_call_starts_at_zero(&LockResolver::new());
}

#[cfg(feature = "lock")]
#[test]
fn lock_sequence_increments_within_same_millis() {
    run_sequence_increments_within_same_millis(&LockResolver::new());
}

#[cfg(feature = "lock")]
#[test]
fn lock_exhaustion_returns_sentinel() {
    run_exhaustion_returns_sentinel(&LockResolver::new());
}

#[cfg(feature = "lock")]
#[test]
fn lock_clock_behind_returns_sentinel() {
    run_clock_behind_returns_sentinel(&LockResolver::from_state(101, 3));
}

#[cfg(feature = "lock")]
#[test]
fn lock_concurrent_callers_never_share_a_sequence() {
    run_concurrent_callers_never_share_a_sequence(&LockResolver::new());
}

#[test]
fn closures_are_resolvers() {
    let fixed = |millis: i64| -> crate::Result<u16> {
        if millis < 0 {
            Err(Error::Resolver { reason: "negative" })
        } else {
            Ok(9)
        }
    };
    run_first_call_starts_at_zero(&|_: i64| -> crate::Result<u16> { Ok(0) });
    assert_eq!(fixed.resolve(3), Ok(9));
    assert_eq!(
        fixed.resolve(-3),
        Err(Error::Resolver { reason: "negative" })
    );
}

#[test]
fn shared_resolvers_draw_from_one_state() {
    let inner = Arc::new(AtomicResolver::new());
    let a = SharedResolver(Arc::clone(&inner));
    let b = SharedResolver(&*inner);

    assert_eq!(a.resolve(8), Ok(0));
    assert_eq!(b.resolve(8), Ok(1));
    assert_eq!(a.resolve(8), Ok(2));
    assert_eq!(inner.state(), (8, 2));

    run_concurrent_callers_never_share_a_sequence(&SharedResolver(Arc::new(
        AtomicResolver::new(),
    )));
}
