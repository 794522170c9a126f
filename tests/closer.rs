#[cfg(test)]
mod tests {
    use sluice::{Closer, Error, SluiceError};
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn closer_default() {
        let closer = Closer::default();
        assert!(!closer.is_closed());
        closer.close().unwrap();
        assert!(closer.is_closed());
        closer.close().unwrap();
        assert_eq!(format!("{closer:?}"), "Closer { closed: true }");
    }

    #[test]
    fn closer_clones_share_the_release() {
        let count = Arc::new(AtomicUsize::new(0));
        let closer = {
            let count = count.clone();
            Closer::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        };
        let other = closer.clone();
        assert_eq!(format!("{other:?}"), "Closer { closed: false }");
        other.close().unwrap();
        assert!(closer.is_closed());
        closer.close().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn closer_concurrent() {
        let count = Arc::new(AtomicUsize::new(0));
        let closer = {
            let count = count.clone();
            Closer::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        };
        let tasks = (0..32)
            .map(|_| {
                let closer = closer.clone();
                tokio::spawn(async move { closer.close() })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(closer.is_closed());
    }

    #[test]
    fn closer_failure() {
        let closer = Closer::new(|| Err(Error::msg("socket closed")));
        let error = closer.close().unwrap_err();
        assert!(error.downcast_ref::<SluiceError>().unwrap().is_disposal());
        assert_eq!(error.to_string(), "Failed to release the row source");
        assert!(closer.is_closed());
        closer.close().unwrap();
    }
}
