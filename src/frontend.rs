use gloo_net::http::Request;
use portfolio_interactions::{
    form::{ContactForm, NotificationKind},
    listener::{ListenerHost, Subscription},
    motion::{EffectFlags, Transition},
    pointer::{CursorTrail, ElementBounds, PointerOffset, PointerTracker, DEFAULT_MAGNETIC_STRENGTH},
    scroll::{
        parallax_offset, ActiveSectionTracker, ScrollProgressTracker, SectionBounds,
        VisibilityObserver, VisibilityOptions, DEFAULT_PARALLAX_RATE,
    },
    submission::SubmissionOutcome,
    validation::{trimmed_len, Field, FormData, MESSAGE_MAX_CHARS},
    viewport::{ViewportSensor, ViewportState, REDUCED_MOTION_QUERY},
};
use serde::Deserialize;
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    window, Element, EventTarget, HtmlElement, HtmlInputElement, HtmlTextAreaElement,
    MediaQueryList,
};
use yew::prelude::*;

const CONTACT_ENDPOINT: &str = "/api/contact";
const CONTACT_STATUS_ENDPOINT: &str = "/api/contact/status";
const REVEAL_TRAVEL_PX: f32 = 24.0;

const SECTIONS: [(&str, &str); 3] = [("about", "About"), ("work", "Work"), ("contact", "Contact")];

#[derive(Clone)]
struct DomHost {
    target: EventTarget,
}

impl DomHost {
    fn new(target: EventTarget) -> Self {
        Self { target }
    }
}

impl ListenerHost for DomHost {
    type Handle = Closure<dyn FnMut()>;

    fn attach(&self, event: &'static str, handler: Box<dyn FnMut()>) -> Option<Self::Handle> {
        let closure = Closure::wrap(handler);
        self.target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .ok()?;
        Some(closure)
    }

    fn detach(&self, event: &'static str, handle: Self::Handle) {
        let _ = self
            .target
            .remove_event_listener_with_callback(event, handle.as_ref().unchecked_ref());
    }
}

fn window_host() -> Option<DomHost> {
    window().map(|win| DomHost::new(win.into()))
}

fn reduced_motion_query() -> Option<MediaQueryList> {
    window()?.match_media(REDUCED_MOTION_QUERY).ok().flatten()
}

fn prefers_reduced_motion() -> bool {
    reduced_motion_query()
        .map(|query| query.matches())
        .unwrap_or(false)
}

fn viewport_width() -> Option<f64> {
    window()?.inner_width().ok()?.as_f64()
}

fn viewport_height() -> f64 {
    window()
        .and_then(|win| win.inner_height().ok())
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0)
}

fn current_scroll_y() -> f64 {
    window()
        .and_then(|win| win.scroll_y().ok())
        .unwrap_or(0.0)
}

fn document_height() -> f64 {
    window()
        .and_then(|win| win.document())
        .and_then(|document| document.document_element())
        .map(|root| f64::from(root.scroll_height()))
        .unwrap_or(0.0)
}

fn element_bounds(node: &NodeRef) -> Option<ElementBounds> {
    let rect = node.cast::<Element>()?.get_bounding_client_rect();
    Some(ElementBounds::new(
        rect.left(),
        rect.top(),
        rect.width(),
        rect.height(),
    ))
}

fn section_bounds() -> Vec<SectionBounds> {
    let Some(document) = window().and_then(|win| win.document()) else {
        return Vec::new();
    };

    SECTIONS
        .iter()
        .filter_map(|(id, _)| document.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok())
        .map(|section| SectionBounds {
            offset_top: f64::from(section.offset_top()),
            height: f64::from(section.offset_height()),
        })
        .collect()
}

#[hook]
fn use_viewport() -> ViewportState {
    let state =
        use_state_eq(|| ViewportSensor::new(viewport_width(), prefers_reduced_motion()).state());

    {
        let state = state.setter();
        use_effect_with((), move |_| {
            let sensor = Rc::new(RefCell::new(ViewportSensor::new(
                viewport_width(),
                prefers_reduced_motion(),
            )));

            let resize = window_host().map(|host| {
                let sensor = Rc::clone(&sensor);
                let state = state.clone();
                Subscription::attach(host, "resize", move || {
                    let Some(width) = viewport_width() else {
                        return;
                    };
                    let mut sensor = sensor.borrow_mut();
                    if sensor.on_resize(width) {
                        state.set(sensor.state());
                    }
                })
            });

            let motion = reduced_motion_query().map(move |query| {
                let host = DomHost::new(query.clone().into());
                Subscription::attach(host, "change", move || {
                    let mut sensor = sensor.borrow_mut();
                    if sensor.set_reduced_motion(query.matches()) {
                        state.set(sensor.state());
                    }
                })
            });

            move || {
                drop(resize);
                drop(motion);
            }
        });
    }

    *state
}

#[derive(Clone, Copy, Default, PartialEq)]
struct ScrollSnapshot {
    scroll_y: f64,
    progress: f64,
}

#[hook]
fn use_scroll() -> ScrollSnapshot {
    let snapshot = use_state_eq(ScrollSnapshot::default);

    {
        let snapshot = snapshot.setter();
        use_effect_with((), move |_| {
            let tracker = RefCell::new(ScrollProgressTracker::default());
            let measure = move || {
                let scroll_y = current_scroll_y();
                let progress =
                    tracker
                        .borrow_mut()
                        .on_scroll(scroll_y, document_height(), viewport_height());
                snapshot.set(ScrollSnapshot { scroll_y, progress });
            };

            measure();
            let subscription =
                window_host().map(|host| Subscription::attach(host, "scroll", measure));
            move || drop(subscription)
        });
    }

    *snapshot
}

#[hook]
fn use_reveal(node: NodeRef, options: VisibilityOptions) -> bool {
    let visible = use_state_eq(|| false);

    {
        let visible = visible.setter();
        use_effect_with((node, options), move |(node, options)| {
            let observer = RefCell::new(VisibilityObserver::new(*options));
            let node = node.clone();
            let measure = Rc::new(move || {
                let Some(bounds) = element_bounds(&node) else {
                    return;
                };
                let width = viewport_width().unwrap_or(0.0);
                let seen = observer
                    .borrow_mut()
                    .observe(&bounds, width, viewport_height());
                visible.set(seen);
            });

            measure();
            let subscriptions: Vec<_> = window_host()
                .into_iter()
                .flat_map(|host| {
                    ["scroll", "resize"].map(|event| {
                        let measure = Rc::clone(&measure);
                        Subscription::attach(host.clone(), event, move || measure())
                    })
                })
                .collect();

            move || drop(subscriptions)
        });
    }

    *visible
}

struct Magnetic {
    style: String,
    onmousemove: Callback<MouseEvent>,
    onmouseleave: Callback<MouseEvent>,
}

/// `strength` of `None` disables the pull entirely.
#[hook]
fn use_magnetic(node: NodeRef, strength: Option<f64>) -> Magnetic {
    let offset = use_state_eq(|| PointerOffset::ZERO);
    let tracker =
        use_mut_ref(|| PointerTracker::new(strength.unwrap_or(DEFAULT_MAGNETIC_STRENGTH)));

    {
        let offset = offset.setter();
        let tracker = tracker.clone();
        use_effect_with(strength, move |strength| {
            let mut pointer = tracker.borrow_mut();
            let retuned = pointer.retune(strength.unwrap_or(DEFAULT_MAGNETIC_STRENGTH));
            if retuned || strength.is_none() {
                offset.set(pointer.on_pointer_leave());
            }
            || ()
        });
    }

    let onmousemove = {
        let offset = offset.setter();
        let tracker = tracker.clone();
        Callback::from(move |event: MouseEvent| {
            if strength.is_none() {
                return;
            }
            let next = tracker.borrow_mut().on_pointer_move(
                element_bounds(&node),
                f64::from(event.client_x()),
                f64::from(event.client_y()),
            );
            offset.set(next);
        })
    };

    let onmouseleave = {
        let offset = offset.setter();
        Callback::from(move |_: MouseEvent| offset.set(tracker.borrow_mut().on_pointer_leave()))
    };

    let transition = if offset.is_zero() {
        Transition::MAGNETIC_RETURN.to_css("transform")
    } else {
        "none".to_string()
    };

    Magnetic {
        style: format!(
            "transform: translate({:.2}px, {:.2}px); transition: {transition};",
            offset.x, offset.y
        ),
        onmousemove,
        onmouseleave,
    }
}

#[derive(Deserialize)]
struct ContactStatus {
    configured: bool,
}

async fn fetch_provider_status() -> Option<bool> {
    let response = Request::get(CONTACT_STATUS_ENDPOINT).send().await.ok()?;
    let status = response.json::<ContactStatus>().await.ok()?;
    Some(status.configured)
}

async fn post_contact(data: &FormData) -> Result<SubmissionOutcome, gloo_net::Error> {
    Request::post(CONTACT_ENDPOINT)
        .json(data)?
        .send()
        .await?
        .json::<SubmissionOutcome>()
        .await
}

#[derive(Clone, Default, PartialEq)]
struct ContactState {
    form: ContactForm,
    attempt: u32,
    outbox: Option<FormData>,
}

enum ContactAction {
    Edit(Field, String),
    Blur(Field),
    ProviderStatus(bool),
    Submit,
    Settled(SubmissionOutcome),
    Failed,
    Dismiss,
}

impl Reducible for ContactState {
    type Action = ContactAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();

        match action {
            ContactAction::Edit(field, value) => next.form.update_field(field, value),
            ContactAction::Blur(field) => next.form.blur_field(field),
            ContactAction::ProviderStatus(configured) => {
                next.form.set_provider_configured(configured)
            }
            ContactAction::Submit => {
                if let Some(data) = next.form.begin_submit() {
                    next.attempt = next.attempt.wrapping_add(1);
                    next.outbox = Some(data);
                }
            }
            ContactAction::Settled(outcome) => {
                next.outbox = None;
                next.form.finish_submit(outcome);
            }
            ContactAction::Failed => {
                next.outbox = None;
                next.form.finish_with_unexpected_error();
            }
            ContactAction::Dismiss => next.form.dismiss_notification(),
        }

        Rc::new(next)
    }
}

fn field_value(event: &InputEvent) -> String {
    if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
        return input.value();
    }

    event
        .target_dyn_into::<HtmlTextAreaElement>()
        .map(|area| area.value())
        .unwrap_or_default()
}

#[derive(Properties, PartialEq)]
struct MagneticButtonProps {
    label: AttrValue,
    #[prop_or_default]
    busy_label: Option<AttrValue>,
    #[prop_or_default]
    disabled: bool,
    #[prop_or(AttrValue::Static("button"))]
    kind: AttrValue,
    #[prop_or_default]
    effects: EffectFlags,
}

#[function_component(MagneticButton)]
fn magnetic_button(props: &MagneticButtonProps) -> Html {
    let viewport = use_context::<ViewportState>().unwrap_or_default();
    let plan = props.effects.resolve(&viewport);
    let node = use_node_ref();
    let magnetic = use_magnetic(
        node.clone(),
        plan.magnetic_strength.filter(|_| !props.disabled),
    );

    let label = match (&props.busy_label, props.disabled) {
        (Some(busy), true) => busy.clone(),
        _ => props.label.clone(),
    };

    html! {
        <button
            ref={node}
            type={props.kind.clone()}
            class={classes!(
                "magnetic-button",
                plan.shimmer.then_some("has-shimmer"),
                plan.glow.then_some("has-glow"),
            )}
            style={magnetic.style}
            disabled={props.disabled}
            onmousemove={magnetic.onmousemove}
            onmouseleave={magnetic.onmouseleave}
        >
            {label}
        </button>
    }
}

#[derive(Properties, PartialEq)]
struct RevealProps {
    id: AttrValue,
    title: AttrValue,
    #[prop_or_default]
    order: u32,
    #[prop_or_default]
    children: Html,
}

#[function_component(RevealSection)]
fn reveal_section(props: &RevealProps) -> Html {
    let viewport = use_context::<ViewportState>().unwrap_or_default();
    let node = use_node_ref();
    let revealed = use_reveal(node.clone(), VisibilityOptions::default());

    let profile = viewport.breakpoint().profile();
    let base = Transition::REVEAL;
    let transition = Transition {
        duration_secs: base.duration_secs * profile.duration_multiplier,
        ..base
    }
    .with_delay(props.order as f32 * profile.stagger_children_secs)
    .optimized(&viewport);

    let travel = if profile.reduced_motion {
        0.0
    } else {
        REVEAL_TRAVEL_PX * profile.scale_multiplier
    };
    let style = if revealed {
        format!(
            "opacity: 1; transform: none; transition: {}, {};",
            transition.to_css("opacity"),
            transition.to_css("transform")
        )
    } else {
        format!("opacity: 0; transform: translateY({travel:.1}px);")
    };

    let heading_id = format!("{}-heading", props.id);

    html! {
        <section
            ref={node}
            id={props.id.clone()}
            class="section-block"
            aria-labelledby={heading_id.clone()}
            style={style}
        >
            <h2 id={heading_id}>{props.title.clone()}</h2>
            {props.children.clone()}
        </section>
    }
}

#[function_component(ScrollProgressBar)]
fn scroll_progress_bar() -> Html {
    let scroll = use_scroll();
    let style = format!("transform: scaleX({:.4});", scroll.progress);

    html! {
        <div
            class="scroll-progress"
            role="progressbar"
            aria-label="Reading progress"
            aria-valuemin="0"
            aria-valuemax="100"
            aria-valuenow={format!("{:.0}", scroll.progress * 100.0)}
            style={style}
        />
    }
}

#[function_component(SiteNav)]
fn site_nav() -> Html {
    let scroll = use_scroll();
    let tracker = use_mut_ref(ActiveSectionTracker::default);
    let active = tracker
        .borrow_mut()
        .on_scroll(scroll.scroll_y, viewport_height(), &section_bounds());

    html! {
        <nav class="site-nav" aria-label="Sections">
            <ul>
                { for SECTIONS.iter().enumerate().map(|(index, (id, label))| html! {
                    <li>
                        <a
                            href={format!("#{id}")}
                            class={classes!((index == active).then_some("is-active"))}
                            aria-current={(index == active).then_some("true")}
                        >
                            {*label}
                        </a>
                    </li>
                }) }
            </ul>
        </nav>
    }
}

#[function_component(Hero)]
fn hero() -> Html {
    let viewport = use_context::<ViewportState>().unwrap_or_default();
    let scroll = use_scroll();
    let offset = if viewport.prefers_simplified_motion() {
        0.0
    } else {
        parallax_offset(scroll.scroll_y, DEFAULT_PARALLAX_RATE)
    };

    html! {
        <header class="hero" aria-labelledby="identity-heading">
            <div class="hero-backdrop" aria-hidden="true" style={format!("transform: translateY({offset:.1}px);")} />
            <h1 id="identity-heading">{"Avani Kulkarni"}</h1>
            <p class="hero-tagline">{"Designer and front-end engineer crafting calm, responsive interfaces."}</p>
            <a class="hero-cta" href="#contact">{"Get in touch"}</a>
        </header>
    }
}

#[function_component(ContactSection)]
fn contact_section() -> Html {
    let state = use_reducer_eq(ContactState::default);

    {
        let dispatcher = state.dispatcher();
        use_effect_with((), move |_| {
            spawn_local(async move {
                if let Some(configured) = fetch_provider_status().await {
                    dispatcher.dispatch(ContactAction::ProviderStatus(configured));
                }
            });
            || ()
        });
    }

    {
        let outbox = state.outbox.clone();
        let dispatcher = state.dispatcher();
        use_effect_with(state.attempt, move |_| {
            if let Some(data) = outbox {
                spawn_local(async move {
                    match post_contact(&data).await {
                        Ok(outcome) => dispatcher.dispatch(ContactAction::Settled(outcome)),
                        Err(_) => dispatcher.dispatch(ContactAction::Failed),
                    }
                });
            }
            || ()
        });
    }

    let on_edit = |field: Field| {
        let dispatcher = state.dispatcher();
        Callback::from(move |event: InputEvent| {
            dispatcher.dispatch(ContactAction::Edit(field, field_value(&event)));
        })
    };

    let on_blur = |field: Field| {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: FocusEvent| dispatcher.dispatch(ContactAction::Blur(field)))
    };

    let on_submit = {
        let dispatcher = state.dispatcher();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            dispatcher.dispatch(ContactAction::Submit);
        })
    };

    let on_dismiss = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(ContactAction::Dismiss))
    };

    let form = &state.form;
    let data = form.data();
    let submitting = form.is_submitting();

    let error_for = |field: Field| -> Html {
        match form.visible_error(field) {
            Some(message) => html! {
                <p class="field-error" id={format!("{}-error", field.as_str())} role="alert">{message}</p>
            },
            None => html! {},
        }
    };
    let invalid = |field: Field| form.visible_error(field).is_some().to_string();

    let notification = form.notification().map(|notification| {
        let kind = match notification.kind {
            NotificationKind::Success => "is-success",
            NotificationKind::Error => "is-error",
        };
        html! {
            <div class={classes!("notification", kind)} role="status">
                <p>{notification.message.clone()}</p>
                <button type="button" class="notification-dismiss" aria-label="Dismiss" onclick={on_dismiss}>{"×"}</button>
            </div>
        }
    });

    html! {
        <RevealSection id="contact" title="Contact" order={2}>
            <form class="contact-form" novalidate={true} onsubmit={on_submit}>
                <label for="name">{"Name"}</label>
                <input
                    id="name"
                    name="name"
                    type="text"
                    autocomplete="name"
                    value={data.name.clone()}
                    disabled={submitting}
                    aria-invalid={invalid(Field::Name)}
                    oninput={on_edit(Field::Name)}
                    onblur={on_blur(Field::Name)}
                />
                {error_for(Field::Name)}

                <label for="email">{"Email"}</label>
                <input
                    id="email"
                    name="email"
                    type="email"
                    autocomplete="email"
                    value={data.email.clone()}
                    disabled={submitting}
                    aria-invalid={invalid(Field::Email)}
                    oninput={on_edit(Field::Email)}
                    onblur={on_blur(Field::Email)}
                />
                {error_for(Field::Email)}

                <label for="message">{"Message"}</label>
                <textarea
                    id="message"
                    name="message"
                    rows="6"
                    value={data.message.clone()}
                    disabled={submitting}
                    aria-invalid={invalid(Field::Message)}
                    oninput={on_edit(Field::Message)}
                    onblur={on_blur(Field::Message)}
                />
                <p class="muted char-count">
                    {format!("{}/{MESSAGE_MAX_CHARS}", trimmed_len(&data.message))}
                </p>
                {error_for(Field::Message)}

                <MagneticButton
                    kind="submit"
                    label="Send message"
                    busy_label={AttrValue::from("Sending…")}
                    disabled={submitting}
                    effects={EffectFlags::magnetic(DEFAULT_MAGNETIC_STRENGTH).with_shimmer().with_glow()}
                />
            </form>
            {for notification}
        </RevealSection>
    }
}

#[function_component(CursorTrailLayer)]
fn cursor_trail_layer(props: &CursorTrailProps) -> Html {
    html! {
        <div class="cursor-trail" aria-hidden="true">
            { for props.points.iter().enumerate().map(|(index, (x, y))| {
                let opacity = (index + 1) as f64 / props.points.len().max(1) as f64;
                html! {
                    <span
                        class="cursor-dot"
                        style={format!("transform: translate({x:.0}px, {y:.0}px); opacity: {opacity:.2};")}
                    />
                }
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct CursorTrailProps {
    points: Vec<(f64, f64)>,
}

#[function_component(App)]
fn app() -> Html {
    let viewport = use_viewport();
    let trail = use_mut_ref(CursorTrail::default);
    let trail_points = use_state_eq(Vec::<(f64, f64)>::new);
    let show_trail = !viewport.is_mobile && !viewport.prefers_simplified_motion();

    let on_pointer_move = {
        let trail = trail.clone();
        let trail_points = trail_points.setter();
        Callback::from(move |event: MouseEvent| {
            if !show_trail {
                return;
            }
            let mut trail = trail.borrow_mut();
            trail.push(f64::from(event.client_x()), f64::from(event.client_y()));
            trail_points.set(trail.points().copied().collect());
        })
    };

    let on_pointer_leave = {
        let trail_points = trail_points.setter();
        Callback::from(move |_: MouseEvent| {
            trail.borrow_mut().clear();
            trail_points.set(Vec::new());
        })
    };

    html! {
        <ContextProvider<ViewportState> context={viewport}>
            <a class="skip-link" href="#content">{"Skip to main content"}</a>
            <ScrollProgressBar />
            <div class="page-shell" onmousemove={on_pointer_move} onmouseleave={on_pointer_leave}>
                <SiteNav />
                <Hero />
                <main id="content">
                    <RevealSection id="about" title="About">
                        <p>
                            {"I design and build interfaces for people who would rather not notice the interface. "}
                            {"Most of my work sits where visual systems meet front-end engineering."}
                        </p>
                    </RevealSection>

                    <RevealSection id="work" title="Work" order={1}>
                        <ul class="row-list">
                            <li>{"Studio Atlas"}<span class="muted">{" · brand system and marketing site"}</span></li>
                            <li>{"Ledgerline"}<span class="muted">{" · dashboard redesign for a fintech team"}</span></li>
                            <li>{"Field Notes"}<span class="muted">{" · offline-first journaling app"}</span></li>
                        </ul>
                    </RevealSection>

                    <ContactSection />
                </main>
            </div>
            if show_trail {
                <CursorTrailLayer points={(*trail_points).clone()} />
            }
        </ContextProvider<ViewportState>>
    }
}

pub fn run() {
    let root = window()
        .and_then(|win| win.document())
        .and_then(|document| document.get_element_by_id("app"));

    match root {
        Some(root) => yew::Renderer::<App>::with_root(root).render(),
        None => yew::Renderer::<App>::new().render(),
    };
}
