use gpui::*;

const RING_SIZE: f32 = 150.0;

/// Progress ring plus a linear bar underneath.
pub struct CountdownRing {
    progress: f32,
    label: String,
    color: Hsla,
    track: Hsla,
    foreground: Hsla,
}

impl CountdownRing {
    pub fn new(progress: f32, label: String, color: Hsla, track: Hsla, foreground: Hsla) -> Self {
        Self {
            progress: progress.clamp(0.0, 1.0),
            label,
            color,
            track,
            foreground,
        }
    }

    fn render_ring(&self) -> Div {
        // GPUI has no arc primitive; the coloured ring fades out as time runs down
        div()
            .relative()
            .size(px(RING_SIZE))
            .flex()
            .items_center()
            .justify_center()
            .child(
                div()
                    .absolute()
                    .size(px(RING_SIZE))
                    .rounded_full()
                    .border_8()
                    .border_color(self.track),
            )
            .child(
                div()
                    .absolute()
                    .size(px(RING_SIZE))
                    .rounded_full()
                    .border_8()
                    .border_color(self.color)
                    .opacity(self.progress),
            )
            .child(
                div()
                    .text_size(px(18.0))
                    .font_weight(FontWeight::BOLD)
                    .text_color(self.foreground)
                    .child(self.label.clone()),
            )
    }

    fn render_bar(&self) -> Div {
        div()
            .w_full()
            .h(px(6.0))
            .rounded(px(3.0))
            .bg(self.track)
            .child(
                div()
                    .h_full()
                    .w(relative(self.progress))
                    .rounded(px(3.0))
                    .bg(self.color),
            )
    }
}

impl IntoElement for CountdownRing {
    type Element = Div;

    fn into_element(self) -> Self::Element {
        div()
            .w_full()
            .flex()
            .flex_col()
            .items_center()
            .gap_4()
            .child(self.render_ring())
            .child(self.render_bar())
    }
}
