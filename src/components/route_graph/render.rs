use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::RouteGraphState;

pub fn render(state: &RouteGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_global_alpha(1.0);
	ctx.set_fill_style_str(state.theme.background);
	ctx.fill_rect(0.0, 0.0, state.bounds.width, state.bounds.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &RouteGraphState, ctx: &CanvasRenderingContext2d) {
	for edge in &state.graph.edges {
		if !state.is_edge_shown(edge) {
			continue;
		}
		let Some((s, t)) = state.graph.resolve(edge) else {
			return;
		};
		let (a, b) = (state.graph.nodes[s].position, state.graph.nodes[t].position);
		let style = state.theme.edge_style(edge.kind);

		ctx.set_global_alpha(state.edge_alpha(edge));
		ctx.set_stroke_style_str(style.color);
		ctx.set_line_width(style.width);
		match style.dash {
			Some((dash, gap)) => {
				let _ = ctx.set_line_dash(&js_sys::Array::of2(
					&JsValue::from_f64(dash),
					&JsValue::from_f64(gap),
				));
			}
			None => {
				let _ = ctx.set_line_dash(&js_sys::Array::new());
			}
		}
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &RouteGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for (idx, node) in state.graph.nodes.iter().enumerate() {
		if !state.is_node_shown(idx) {
			continue;
		}
		let style = state.theme.node_style(node.kind);
		let p = node.position;

		ctx.set_global_alpha(state.node_alpha(idx));
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, style.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(style.fill);
		ctx.fill();
		ctx.set_stroke_style_str(style.stroke);
		ctx.set_line_width(style.stroke_width);
		ctx.stroke();

		if state.is_hovered(idx) {
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, style.radius + style.stroke_width + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(state.theme.label_color);
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		if state.show_labels {
			ctx.set_fill_style_str(state.theme.label_color);
			ctx.set_font(&format!("bold {}px sans-serif", style.font_px));
			let _ = ctx.fill_text(&node.label(), p.x, p.y);
		}
	}
	ctx.set_global_alpha(1.0);
}
