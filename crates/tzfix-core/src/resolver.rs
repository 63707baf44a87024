/// Maps geographic coordinates to an IANA timezone identifier.
///
/// Resolution is local and synchronous; `None` means the point is not covered.
pub trait TimezoneResolver {
    fn resolve(&self, latitude: f64, longitude: f64) -> Option<String>;
}

impl<F> TimezoneResolver for F
where
    F: Fn(f64, f64) -> Option<String>,
{
    fn resolve(&self, latitude: f64, longitude: f64) -> Option<String> {
        self(latitude, longitude)
    }
}

#[cfg(feature = "runtime")]
pub use polygon::PolygonResolver;

#[cfg(feature = "runtime")]
mod polygon {
    use once_cell::sync::Lazy;
    use tzf_rs::DefaultFinder;

    use super::TimezoneResolver;

    // Loading the boundary data takes a noticeable moment; do it once.
    static FINDER: Lazy<DefaultFinder> = Lazy::new(DefaultFinder::new);

    /// Offline resolver backed by the bundled timezone boundary polygons.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PolygonResolver;

    impl PolygonResolver {
        pub fn new() -> Self {
            Self
        }

        /// Forces the boundary data to load now rather than on first lookup.
        pub fn warm_up(&self) {
            Lazy::force(&FINDER);
        }
    }

    impl TimezoneResolver for PolygonResolver {
        fn resolve(&self, latitude: f64, longitude: f64) -> Option<String> {
            let name = FINDER.get_tz_name(longitude, latitude);
            if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            }
        }
    }
}
