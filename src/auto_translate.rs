//! Debounced automatic translation of the source pane.
//!
//! Every edit bumps a generation counter and re-arms the debounce timer.
//! When the timer fires, the text is translated on a worker thread and the
//! result is applied only if no newer edit happened meanwhile.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::debounce::Debouncer;
use crate::translate::{Translator, SOURCE_AUTO};

/// Quiet period after the last edit before translating.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2200);

/// Called whenever the view changes off the UI thread.
pub type RepaintNotifier = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TranslationStatus {
    /// Nothing to report
    #[default]
    Idle,
    /// Input changed; waiting for the quiet period
    Pending,
    /// A request is in flight
    Translating,
    /// The output pane holds the translation of the current input
    Done,
    /// The last request failed; output keeps its previous text
    Failed(String),
}

/// What the UI shows: output pane text plus status line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationView {
    pub output: String,
    pub status: TranslationStatus,
}

struct State {
    view: TranslationView,
    generation: u64,
    target_lang: String,
}

struct Shared {
    state: Mutex<State>,
    translator: Arc<dyn Translator>,
    notifier: Mutex<Option<RepaintNotifier>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking worker must not take the UI down with it
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify(&self) {
        let notifier = self
            .notifier
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(f) = notifier {
            f();
        }
    }
}

struct Request {
    generation: u64,
    text: String,
}

pub struct AutoTranslator {
    shared: Arc<Shared>,
    debouncer: Debouncer<Request>,
}

impl AutoTranslator {
    pub fn new(translator: Arc<dyn Translator>, target_lang: &str, delay: Duration) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                view: TranslationView::default(),
                generation: 0,
                target_lang: target_lang.to_string(),
            }),
            translator,
            notifier: Mutex::new(None),
        });
        let for_timer = shared.clone();
        let debouncer = Debouncer::new(delay, move |req: Request| fire(&for_timer, req));
        Self { shared, debouncer }
    }

    pub fn set_notifier(&self, notifier: RepaintNotifier) {
        *self
            .shared
            .notifier
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(notifier);
    }

    /// Record an edit of the source pane and restart the quiet period.
    pub fn input_changed(&self, text: &str) {
        let generation = {
            let mut st = self.shared.lock();
            st.generation += 1;
            st.view.status = TranslationStatus::Pending;
            st.generation
        };
        self.debouncer.trigger(Request {
            generation,
            text: text.to_string(),
        });
    }

    /// Language used by the next request.
    pub fn set_target_lang(&self, code: &str) {
        self.shared.lock().target_lang = code.to_string();
    }

    #[cfg(test)]
    fn target_lang(&self) -> String {
        self.shared.lock().target_lang.clone()
    }

    pub fn view(&self) -> TranslationView {
        self.shared.lock().view.clone()
    }
}

fn fire(shared: &Arc<Shared>, req: Request) {
    let text = req.text.trim().to_string();
    let target = {
        let mut st = shared.lock();
        if st.generation != req.generation {
            return;
        }
        if text.is_empty() {
            st.view.output.clear();
            st.view.status = TranslationStatus::Idle;
            drop(st);
            shared.notify();
            return;
        }
        st.view.status = TranslationStatus::Translating;
        st.target_lang.clone()
    };
    shared.notify();

    let worker = shared.clone();
    let spawned = std::thread::Builder::new()
        .name("translate-worker".into())
        .spawn(move || {
            tracing::info!(
                "translating {} chars into '{}' (generation {})",
                text.chars().count(),
                target,
                req.generation
            );
            let result = worker.translator.translate(&text, SOURCE_AUTO, &target);
            {
                let mut st = worker.lock();
                if st.generation != req.generation {
                    tracing::debug!("discarding result of superseded request {}", req.generation);
                    return;
                }
                match result {
                    Ok(translated) => {
                        st.view.output = translated;
                        st.view.status = TranslationStatus::Done;
                    }
                    Err(e) => {
                        tracing::warn!("translation failed: {}", e);
                        st.view.status = TranslationStatus::Failed(e.to_string());
                    }
                }
            }
            worker.notify();
        });
    if let Err(e) = spawned {
        tracing::error!("failed to start translation worker: {}", e);
        let mut st = shared.lock();
        if st.generation == req.generation {
            st.view.status = TranslationStatus::Failed(e.to_string());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::translate::{TranslateError, TranslateResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::sleep;
    use std::time::Instant;

    /// Records every call; answers `<target>:<text>` or fails on demand.
    #[derive(Default)]
    pub(crate) struct FakeTranslator {
        pub calls: Mutex<Vec<(String, String, String)>>,
        pub fail_with: Mutex<Option<String>>,
        pub latency: Mutex<Duration>,
        pub in_flight: AtomicUsize,
    }

    impl FakeTranslator {
        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Translator for FakeTranslator {
        fn translate(&self, text: &str, source: &str, target: &str) -> TranslateResult<String> {
            let latency = *self.latency.lock().unwrap();
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), source.to_string(), target.to_string()));
            sleep(latency);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if let Some(msg) = self.fail_with.lock().unwrap().clone() {
                return Err(TranslateError::new(msg));
            }
            Ok(format!("{}:{}", target, text))
        }
    }

    pub(crate) fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            sleep(Duration::from_millis(10));
        }
        cond()
    }

    const DELAY: Duration = Duration::from_millis(150);
    const PATIENCE: Duration = Duration::from_secs(3);

    fn setup() -> (Arc<FakeTranslator>, AutoTranslator) {
        let fake = Arc::new(FakeTranslator::default());
        let auto = AutoTranslator::new(fake.clone(), "de", DELAY);
        (fake, auto)
    }

    #[test]
    fn burst_of_edits_translates_last_text_once() {
        let (fake, auto) = setup();
        auto.input_changed("H");
        sleep(Duration::from_millis(40));
        auto.input_changed("Hel");
        sleep(Duration::from_millis(40));
        auto.input_changed("Hello");
        assert_eq!(auto.view().status, TranslationStatus::Pending);

        assert!(wait_until(PATIENCE, || auto.view().status == TranslationStatus::Done));
        sleep(DELAY * 2);
        let calls = fake.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![("Hello".to_string(), "auto".to_string(), "de".to_string())]
        );
        assert_eq!(auto.view().output, "de:Hello");
    }

    #[test]
    fn empty_input_clears_without_calling() {
        let (fake, auto) = setup();
        auto.input_changed("Hi");
        assert!(wait_until(PATIENCE, || auto.view().status == TranslationStatus::Done));
        assert_eq!(auto.view().output, "de:Hi");

        auto.input_changed("   ");
        assert!(wait_until(PATIENCE, || auto.view().status == TranslationStatus::Idle));
        assert_eq!(auto.view(), TranslationView::default());
        assert_eq!(fake.call_count(), 1);
    }

    #[test]
    fn failure_keeps_previous_output() {
        let (fake, auto) = setup();
        auto.input_changed("one");
        assert!(wait_until(PATIENCE, || auto.view().status == TranslationStatus::Done));

        *fake.fail_with.lock().unwrap() = Some("quota exceeded".into());
        auto.input_changed("two");
        assert!(wait_until(PATIENCE, || matches!(
            auto.view().status,
            TranslationStatus::Failed(_)
        )));
        let view = auto.view();
        assert_eq!(view.output, "de:one");
        match view.status {
            TranslationStatus::Failed(msg) => assert!(msg.contains("quota exceeded")),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn superseded_result_is_discarded() {
        let (fake, auto) = setup();
        *fake.latency.lock().unwrap() = Duration::from_millis(400);
        auto.input_changed("old");
        assert!(wait_until(PATIENCE, || fake.in_flight.load(Ordering::SeqCst) == 1));

        // Edit while the first request is still on the wire
        *fake.latency.lock().unwrap() = Duration::ZERO;
        auto.input_changed("new");
        assert!(wait_until(PATIENCE, || fake.call_count() == 2
            && auto.view().status == TranslationStatus::Done));
        sleep(Duration::from_millis(500));
        assert_eq!(auto.view().output, "de:new");
        assert_eq!(auto.view().status, TranslationStatus::Done);
    }

    #[test]
    fn target_language_applies_to_next_request() {
        let (fake, auto) = setup();
        auto.set_target_lang("ja");
        auto.input_changed("cat");
        assert!(wait_until(PATIENCE, || auto.view().status == TranslationStatus::Done));
        assert_eq!(fake.calls.lock().unwrap()[0].2, "ja");
        assert_eq!(auto.target_lang(), "ja");
    }

    #[test]
    fn notifier_runs_on_completion() {
        let (_fake, auto) = setup();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        auto.set_notifier(Arc::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        }));
        auto.input_changed("ping");
        assert!(wait_until(PATIENCE, || auto.view().status == TranslationStatus::Done));
        // Translating + Done
        assert!(wait_until(PATIENCE, || hits.load(Ordering::SeqCst) >= 2));
    }
}
