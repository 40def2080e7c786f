use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{GraphViewState, NODE_RADIUS, node_color, node_radius};
use crate::graph::{EdgeKind, GraphNode, NodeKind, Position};

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn edge_rgb(kind: EdgeKind) -> &'static str {
	match kind {
		EdgeKind::Doc => "100, 180, 255",
		EdgeKind::AssetRef => "180, 180, 180",
		EdgeKind::BlueprintRef => "120, 200, 255",
	}
}

fn draw_edges(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.highlight.highlight_t);
	let (focus, positions, graph) = (
		state.effective_focus(),
		state.engine.positions(),
		state.engine.rendered(),
	);

	for edge in &graph.edges {
		let (Some(p1), Some(p2)) = (positions.get(&edge.source), positions.get(&edge.target)) else {
			continue;
		};
		let radius = |id: &str| graph.node(id).map(node_radius).unwrap_or(NODE_RADIUS);
		let (source_radius, target_radius) = (radius(&edge.source), radius(&edge.target));
		let Some(((sx, sy), (ex, ey), (ux, uy))) =
			edge_span(p1, p2, source_radius, target_radius + arrow_size)
		else {
			continue;
		};

		// Lit edges brighten while the highlight fades in, dimmed ones fade out.
		let weight_scale = 1.0 + (edge.weight as f64).ln();
		let (edge_alpha, arrow_alpha, width) = if !focus.is_edge_dimmed(edge) {
			(0.6 + 0.3 * t, 0.8 + 0.1 * t, line_width * weight_scale * (1.0 + 0.3 * t))
		} else {
			(0.6 - 0.45 * t, 0.8 - 0.45 * t, line_width * weight_scale * (1.0 - 0.3 * t))
		};
		let rgb = edge_rgb(edge.kind);

		ctx.set_stroke_style_str(&format!("rgba({}, {})", rgb, edge_alpha));
		ctx.set_line_width(width);
		if edge.kind == EdgeKind::Doc {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		} else {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}

		ctx.begin_path();
		ctx.move_to(sx, sy);
		ctx.line_to(ex, ey);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(&format!("rgba({}, {})", rgb, arrow_alpha));
		let (tip_x, tip_y) = (p2.x - ux * target_radius, p2.y - uy * target_radius);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

/// Line from the rim of the source circle to `end_inset` short of the target
/// centre, plus the unit direction. `None` when the endpoints coincide.
fn edge_span(
	p1: Position,
	p2: Position,
	start_inset: f64,
	end_inset: f64,
) -> Option<((f64, f64), (f64, f64), (f64, f64))> {
	let (dx, dy) = (p2.x - p1.x, p2.y - p1.y);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return None;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	Some((
		(p1.x + ux * start_inset, p1.y + uy * start_inset),
		(p2.x - ux * end_inset, p2.y - uy * end_inset),
		(ux, uy),
	))
}

fn label(node: &GraphNode) -> String {
	match (node.kind, node.member_count) {
		(NodeKind::Group, Some(members)) => format!("{} ({})", node.title, members),
		_ => node.title.clone(),
	}
}

fn draw_nodes(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.highlight.highlight_t),
		state.transform.k,
	);
	let (focus, positions) = (state.effective_focus(), state.engine.positions());
	let nodes = &state.engine.rendered().nodes;

	// Dimmed nodes first so lit ones draw on top.
	for node in nodes {
		let Some(p) = positions.get(&node.id) else {
			continue;
		};
		if has_highlight && !focus.is_node_dimmed(&node.id) {
			continue;
		}
		let base = node_radius(node);
		let (alpha, radius) = if has_highlight {
			(1.0 - 0.7 * t, base * (1.0 - 0.15 * t))
		} else {
			(1.0, base)
		};

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&node_color(node));
		ctx.fill();
		ctx.set_global_alpha(1.0);

		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.8));
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		let _ = ctx.fill_text(&label(node), p.x + radius + 3.0, p.y + 3.0);
	}

	if !has_highlight {
		return;
	}

	for node in nodes {
		let Some(p) = positions.get(&node.id) else {
			continue;
		};
		if focus.is_node_dimmed(&node.id) {
			continue;
		}
		let base = node_radius(node);
		let is_hovered = state.is_hovered(&node.id);

		let (radius, glow_radius) = if is_hovered {
			(base * (1.0 + 0.35 * t), base * (1.8 + 1.2 * t))
		} else {
			(base * (1.0 + 0.2 * t), base * (1.4 + 0.6 * t))
		};

		if t > 0.01 {
			if let Ok(gradient) = ctx.create_radial_gradient(p.x, p.y, radius * 0.3, p.x, p.y, glow_radius) {
				let alpha = if is_hovered { 0.35 * t } else { 0.2 * t };
				let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", alpha));
				let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
				let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
				ctx.begin_path();
				let _ = ctx.arc(p.x, p.y, glow_radius, 0.0, 2.0 * PI);
				#[allow(deprecated)]
				ctx.set_fill_style(&gradient);
				ctx.fill();
			}
		}

		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&node_color(node));
		ctx.fill();

		if is_hovered && t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.7 * t));
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}

		ctx.set_fill_style_str("white");
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		let _ = ctx.fill_text(&label(node), p.x + radius + 3.0, p.y + 3.0);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn edges_leave_from_the_rim_of_large_groups() {
		let group = GraphNode::group("group:category:NPC", "NPC", 9);
		let rim = node_radius(&group);
		assert!(rim > NODE_RADIUS);

		let ((sx, sy), (ex, _), (ux, _)) =
			edge_span(Position::new(0.0, 0.0), Position::new(100.0, 0.0), rim, NODE_RADIUS).unwrap();
		assert_eq!((sx, sy), (rim, 0.0));
		assert_eq!(ex, 100.0 - NODE_RADIUS);
		assert_eq!(ux, 1.0);
		assert!(edge_span(Position::new(1.0, 1.0), Position::new(1.0, 1.0), rim, rim).is_none());
	}
}
