use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::GraphConfig;
use super::export;
use super::filter::{FilterKey, FilterState};
use super::layout::LayoutKind;
use super::normalize::GraphPayload;
use super::render;
use super::state::RouteGraphState;
use super::stats::GraphStats;
use super::tooltip::Tooltip;
use super::types::Bounds;
use crate::error::GraphError;

/// Frame time assumed before the first timestamp arrives.
const FIRST_FRAME_SECS: f64 = 0.016;
/// Longest step fed to the simulation after the tab was in the background.
const MAX_FRAME_SECS: f64 = 0.1;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;
type ResizeCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Shared handle on a mounted graph view. Empty until the canvas is set up
/// and again after the view is disposed.
#[derive(Clone, Default)]
pub struct GraphContext(Rc<RefCell<Option<RouteGraphState>>>);

impl GraphContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_state<R>(&self, f: impl FnOnce(&mut RouteGraphState) -> R) -> Option<R> {
		self.0.borrow_mut().as_mut().map(f)
	}

	pub fn is_mounted(&self) -> bool {
		self.0.borrow().is_some()
	}

	fn install(&self, state: RouteGraphState) {
		*self.0.borrow_mut() = Some(state);
	}

	fn teardown(&self) {
		if let Some(mut state) = self.0.borrow_mut().take() {
			state.cancel_replay();
			state.simulation.stop();
		}
	}
}

/// What the overlay panels display, mirrored out of the state.
#[derive(Clone, Copy)]
struct GraphSignals {
	stats: RwSignal<GraphStats>,
	status: RwSignal<String>,
	tooltip: RwSignal<Option<Tooltip>>,
	filters: RwSignal<FilterState>,
	/// Why the graph is empty, when the payload was unusable.
	payload_problem: RwSignal<Option<String>>,
	empty: RwSignal<bool>,
	setup_error: RwSignal<Option<String>>,
	running: RwSignal<bool>,
	heat: RwSignal<bool>,
}

impl GraphSignals {
	fn new() -> Self {
		Self {
			stats: RwSignal::new(GraphStats::default()),
			status: RwSignal::new(String::new()),
			tooltip: RwSignal::new(None),
			filters: RwSignal::new(FilterState::default()),
			payload_problem: RwSignal::new(None),
			empty: RwSignal::new(false),
			setup_error: RwSignal::new(None),
			running: RwSignal::new(true),
			heat: RwSignal::new(false),
		}
	}

	fn sync(&self, state: &RouteGraphState) {
		self.stats.set(state.stats);
		self.filters.set(state.filter.clone());
		self.payload_problem.set(state.problem.as_ref().map(ToString::to_string));
		self.empty.set(state.is_empty());
		self.tooltip.set(None);
		self.sync_controls(state);
	}

	fn sync_controls(&self, state: &RouteGraphState) {
		self.running.set(!state.paused);
		self.heat.set(state.heat);
		self.sync_status(state);
	}

	fn sync_status(&self, state: &RouteGraphState) {
		if self.status.with_untracked(|s| s != state.status()) {
			self.status.set(state.status().to_string());
		}
	}
}

fn measure(canvas: &HtmlCanvasElement, window: &Window, fullscreen: bool, config: &GraphConfig) -> Bounds {
	if fullscreen {
		let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
			v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
		};
		return Bounds::new(
			dim(window.inner_width(), config.fallback_width),
			dim(window.inner_height(), config.fallback_height),
		);
	}
	let parent = canvas.parent_element();
	let width = parent
		.as_ref()
		.map(|p| p.client_width() as f64)
		.filter(|w| *w > 0.0)
		.unwrap_or(config.fallback_width);
	let height = parent
		.as_ref()
		.map(|p| p.client_height() as f64)
		.filter(|h| *h > 0.0)
		.unwrap_or(config.fallback_height);
	Bounds::new(width, height)
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn reload_page() {
	if let Some(window) = web_sys::window() {
		let _ = window.location().reload();
	}
}

fn export_current(state: &mut RouteGraphState) {
	let result = state
		.export_json()
		.and_then(|json| export::download_json(&json, &state.config.export_filename));
	if let Err(err) = result {
		error!("{}", err);
	}
}

/// Size the canvas, build the state and start the resize listener and the
/// animation loop. The loop stops itself once `alive` is disposed.
fn mount_canvas(
	canvas: HtmlCanvasElement,
	payload: &GraphPayload,
	config: &GraphConfig,
	fullscreen: bool,
	context: &GraphContext,
	signals: GraphSignals,
	alive: StoredValue<bool>,
) -> Result<(), GraphError> {
	let window = web_sys::window().ok_or_else(|| GraphError::Setup("no window".into()))?;
	let bounds = measure(&canvas, &window, fullscreen, config);
	canvas.set_width(bounds.width as u32);
	canvas.set_height(bounds.height as u32);

	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")?
		.ok_or_else(|| GraphError::Setup("2d canvas context unavailable".into()))?
		.dyn_into()
		.map_err(|_| GraphError::Setup("unexpected canvas context type".into()))?;

	let mut unit = js_sys::Math::random;
	let state = RouteGraphState::new(payload, bounds, config.clone(), &mut unit);
	signals.sync(&state);
	context.install(state);

	let resize_cb: ResizeCallback = Rc::new(RefCell::new(None));
	let (context_resize, canvas_resize, config_resize) =
		(context.clone(), canvas.clone(), config.clone());
	*resize_cb.borrow_mut() = Some(Closure::new(move || {
		let Some(win) = web_sys::window() else {
			return;
		};
		let bounds = measure(&canvas_resize, &win, fullscreen, &config_resize);
		canvas_resize.set_width(bounds.width as u32);
		canvas_resize.set_height(bounds.height as u32);
		context_resize.with_state(|s| s.resize(bounds.width, bounds.height));
	}));
	if let Some(ref cb) = *resize_cb.borrow() {
		window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())?;
	}

	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let (context_anim, animate_inner) = (context.clone(), animate.clone());
	let mut last_frame: Option<f64> = None;
	*animate.borrow_mut() = Some(Closure::new(move |now: f64| {
		let Some(win) = web_sys::window() else {
			return;
		};
		if !alive.try_get_value().unwrap_or(false) {
			context_anim.teardown();
			if let Some(ref cb) = *resize_cb.borrow() {
				let _ = win.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
			debug!("graph view disposed, animation loop stopped");
			return;
		}
		let dt = last_frame
			.map(|last| ((now - last) / 1000.0).clamp(0.0, MAX_FRAME_SECS))
			.unwrap_or(FIRST_FRAME_SECS);
		last_frame = Some(now);

		context_anim.with_state(|s| {
			s.tick(dt);
			render::render(s, &ctx);
			signals.sync_status(s);
		});
		if let Some(ref cb) = *animate_inner.borrow() {
			let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	}));
	if let Some(ref cb) = *animate.borrow() {
		window.request_animation_frame(cb.as_ref().unchecked_ref())?;
	}
	debug!("graph canvas mounted at {}x{}", bounds.width, bounds.height);
	Ok(())
}

/// Canvas view of a delivery routing graph, with its controls, legend,
/// statistics and tooltip overlays.
#[component]
pub fn RouteGraphCanvas(
	#[prop(into)] data: Signal<GraphPayload>,
	#[prop(optional)] config: Option<GraphConfig>,
	#[prop(optional)] context: Option<GraphContext>,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let config = config.unwrap_or_default();
	let context = context.unwrap_or_default();
	let theme = config.theme();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let signals = GraphSignals::new();
	let alive = StoredValue::new(true);

	let (context_init, config_init) = (context.clone(), config.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if context_init.is_mounted() {
			return;
		}
		let payload = data.get_untracked();
		if let Err(err) = mount_canvas(
			canvas.into(),
			&payload,
			&config_init,
			fullscreen,
			&context_init,
			signals,
			alive,
		) {
			error!("{}", err);
			signals.setup_error.set(Some(err.to_string()));
		}
	});

	// new payloads replace the graph wholesale
	let context_data = context.clone();
	Effect::new(move |prev: Option<()>| {
		let payload = data.get();
		if prev.is_none() {
			return;
		}
		let mut unit = js_sys::Math::random;
		let rebuilt = context_data.with_state(|s| {
			s.rebuild(&payload, &mut unit);
			signals.sync(s);
		});
		if rebuilt.is_some() {
			info!("graph rebuilt from a new payload");
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		context_md.with_state(|s| match s.node_at_position(x, y) {
			Some(idx) => s.begin_drag(idx, x, y),
			None => s.begin_pan(x, y),
		});
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		context_mm.with_state(|s| {
			if s.drag.active {
				s.drag_to(x, y);
				return;
			}
			s.pan_to(x, y);
			let hovered = if s.pan.active {
				None
			} else {
				s.node_at_position(x, y)
			};
			signals.tooltip.set(s.set_hover(hovered, (x, y)));
		});
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		context_mu.with_state(RouteGraphState::end_pointer);
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		context_ml.with_state(|s| {
			s.end_pointer();
			s.set_hover(None, (0.0, 0.0));
		});
		signals.tooltip.set(None);
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		context_wh.with_state(|s| s.zoom_at(x, y, ev.delta_y()));
	};

	let context_action = context.clone();
	let action = move |f: fn(&mut RouteGraphState)| {
		let context = context_action.clone();
		move |_: MouseEvent| {
			context.with_state(|s| {
				f(s);
				signals.sync_controls(s);
			});
		}
	};

	let controls = config.show_controls.then(|| {
		let (context_charge, context_link) = (context.clone(), context.clone());
		let (context_labels, context_clusters) = (context.clone(), context.clone());
		view! {
			<div class="route-graph-controls">
				<div class="route-graph-buttons">
					<button on:click=action(RouteGraphState::reset_view)>"Reset view"</button>
					<button
						class:active=move || signals.running.get()
						on:click=action(|s| {
							s.toggle_simulation();
						})
					>
						{move || if signals.running.get() { "Pause" } else { "Resume" }}
					</button>
					<button on:click=action(|s| s.retarget(LayoutKind::Free))>"Free layout"</button>
					<button on:click=action(|s| s.retarget(LayoutKind::Grid))>"Grid"</button>
					<button on:click=action(|s| s.retarget(LayoutKind::Cluster))>"Clusters"</button>
					<button on:click=action(RouteGraphState::highlight_route)>"Highlight route"</button>
					<button
						class:active=move || signals.heat.get()
						on:click=action(|s| {
							s.toggle_heat();
						})
					>
						"Heat view"
					</button>
					<button on:click=action(|s| {
						s.start_replay(None);
					})>"Replay search"</button>
					<button on:click=action(RouteGraphState::cancel_replay)>"Stop replay"</button>
					<button on:click=action(export_current)>"Export JSON"</button>
				</div>
				<label>
					"Repulsion "
					<input
						type="range"
						min="-1000"
						max="0"
						step="10"
						value=theme.charge_strength.to_string()
						on:input=move |ev| {
							if let Ok(v) = event_target_value(&ev).parse::<f64>() {
								context_charge.with_state(|s| s.set_charge_strength(v));
							}
						}
					/>
				</label>
				<label>
					"Link strength "
					<input
						type="range"
						min="0"
						max="1"
						step="0.05"
						value=theme.link_strength.unwrap_or(0.5).to_string()
						on:input=move |ev| {
							if let Ok(v) = event_target_value(&ev).parse::<f64>() {
								context_link.with_state(|s| s.set_link_strength(v));
							}
						}
					/>
				</label>
				<label>
					<input
						type="checkbox"
						checked=true
						on:change=move |ev| {
							let show = event_target_checked(&ev);
							context_labels.with_state(|s| s.set_show_labels(show));
						}
					/>
					" Labels"
				</label>
				<label>
					<input
						type="checkbox"
						checked=true
						on:change=move |ev| {
							let show = event_target_checked(&ev);
							context_clusters.with_state(|s| s.set_show_clusters(show));
						}
					/>
					" Clusters"
				</label>
				<div class="route-graph-status">{move || signals.status.get()}</div>
			</div>
		}
	});

	let legend = FilterKey::ALL
		.into_iter()
		.map(|key| {
			let context_legend = context.clone();
			let swatch = format!("background: {};", key.swatch(&theme));
			view! {
				<button
					class="route-graph-legend-item"
					class:filtered=move || !signals.filters.with(|f| f.is_visible(key))
					on:click=move |_| {
						if let Some(filter) = context_legend.with_state(|s| {
							s.toggle_filter(key);
							s.filter.clone()
						}) {
							signals.filters.set(filter);
						}
					}
				>
					<span class="route-graph-swatch" style=swatch></span>
					{key.label()}
				</button>
			}
		})
		.collect_view();

	let (test_href, optimize_href) = (config.test_data_href.clone(), config.optimize_href.clone());
	let container_style = if fullscreen {
		"position: fixed; inset: 0;"
	} else {
		"position: relative; width: 100%; height: 100%;"
	};

	view! {
		<div class="route-graph" style=container_style>
			<canvas
				node_ref=canvas_ref
				class="route-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			{controls}
			<div class="route-graph-legend">{legend}</div>
			<div class="route-graph-stats">
				<span>"Nodes: " {move || signals.stats.get().nodes}</span>
				<span>"Edges: " {move || signals.stats.get().edges}</span>
				<span>"Clusters: " {move || signals.stats.get().clusters}</span>
				<span>"Density: " {move || signals.stats.get().density_label()}</span>
			</div>
			{move || {
				signals
					.tooltip
					.get()
					.map(|tip| {
						let style = format!(
							"position: absolute; left: {}px; top: {}px; pointer-events: none;",
							tip.left,
							tip.top,
						);
						view! {
							<div class="route-graph-tooltip" style=style>
								<strong>{tip.title}</strong>
								{tip
									.rows
									.into_iter()
									.map(|(name, value)| view! { <div><b>{name} ": "</b>{value}</div> })
									.collect_view()}
							</div>
						}
					})
			}}
			{move || {
				signals
					.empty
					.get()
					.then(|| {
						view! {
							<div class="route-graph-empty">
								<p>"No optimization found. Run an optimization first."</p>
								{move || signals.payload_problem.get().map(|why| view! { <small>{why}</small> })}
							</div>
						}
					})
			}}
			{move || {
				signals
					.setup_error
					.get()
					.map(|message| {
						view! {
							<div class="route-graph-error">
								<h4>"Graph visualization error"</h4>
								<p>{message}</p>
								<div class="route-graph-error-actions">
									<button on:click=|_| reload_page()>"Reload page"</button>
									<a href=test_href.clone()>"Use test data"</a>
									<a href=optimize_href.clone()>"Run an optimization"</a>
								</div>
								<small>"Check the browser console for technical details."</small>
							</div>
						}
					})
			}}
		</div>
	}
}
