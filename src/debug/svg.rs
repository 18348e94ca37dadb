use std::{fmt, io, path, sync::atomic::{AtomicUsize, Ordering}};

use num_traits::ToPrimitive;

use crate::{Bounds, Mesh, Vertex, debug};

static OUTPUT_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub(crate) struct SvgOutput<'a> {
    pub context: &'a SvgContext,
    content: String,
}

impl<'a> SvgOutput<'a> {
    pub fn new(context: &'a SvgContext) -> Self {
        Self {
            context,
            content: String::new(),
        }
    }

    pub fn append_element<State, E: SvgElement<State>>(&mut self, element: &E, state: &State) -> fmt::Result {
        element.write_svg(self, state)
    }

    pub fn save<P: AsRef<path::Path>>(self, file_name: P) -> io::Result<()> {
        use std::io::Write;

        let path = self.context.output_path.join(file_name);
        let f = std::fs::File::create(path)?;
        let mut w = io::BufWriter::new(&f);

        writeln!(w, "<svg viewBox=\"{}, {}, {}, {}\" xmlns=\"http://www.w3.org/2000/svg\">", self.context.view_x_min, self.context.view_y_min, self.context.view_w(), self.context.view_h())?;
        writeln!(w, "{}", self.content)?;
        writeln!(w, "</svg>")?;
        w.flush()
    }
}

impl<'a> fmt::Write for SvgOutput<'a> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.content.write_str(s)
    }
}

pub(crate) struct SvgContext {
    pub output_path: path::PathBuf,
    pub view_x_min: f32,
    pub view_x_max: f32,
    pub view_y_min: f32,
    pub view_y_max: f32,
    pub show_labels: bool,
}

impl SvgContext {
    /// Reads the output settings from the environment, or `None` if output is disabled
    pub fn from_env<V: Vertex>(outer: &[V]) -> Option<Self> {
        let output_path = debug::env::svg::output_path()?;
        let show_labels = debug::env::svg::show_labels();

        let bounds = Bounds::of(outer)?;
        let mut view_x_min = to_f32(bounds.x_min);
        let mut view_x_max = to_f32(bounds.x_max);
        let mut view_y_min = to_f32(bounds.y_min);
        let mut view_y_max = to_f32(bounds.y_max);

        let w = view_x_max - view_x_min;
        let h = view_y_max - view_y_min;
        let margin_scale = 0.1;
        view_x_min -= w * margin_scale;
        view_x_max += w * margin_scale;
        view_y_min -= h * margin_scale;
        view_y_max += h * margin_scale;

        Some(Self {
            output_path,
            view_x_min,
            view_x_max,
            view_y_min,
            view_y_max,
            show_labels,
        })
    }

    pub fn view_w(&self) -> f32 { self.view_x_max - self.view_x_min }
    pub fn view_h(&self) -> f32 { self.view_y_max - self.view_y_min }

    pub fn view_min_size(&self) -> f32 { self.view_w().min(self.view_h()) }

    pub fn percent(&self, p: f32) -> f32 { self.view_min_size() * p / 100.0 }
}

pub(crate) trait SvgElement<State=()> {
    fn write_svg(&self, svg_output: &mut SvgOutput<'_>, state: &State) -> fmt::Result;
}

// svg_fmt is missing a function for Circle
pub(crate) fn circle(x: f32, y: f32, r: f32) -> svg_fmt::Circle {
    svg_fmt::Circle {
        x,
        y,
        radius: r,
        style: svg_fmt::Style::default(),
    }
}

fn to_f32<C: ToPrimitive>(c: C) -> f32 {
    c.to_f32().unwrap_or(0.0)
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum RingRole {
    Outer,
    Hole,
    /// A hole dropped by the bounds filter
    FilteredHole,
}

struct RingOutline<'a, V: Vertex> {
    ring: &'a [V],
    role: RingRole,
}

impl<'a, V: Vertex> SvgElement for RingOutline<'a, V> {
    fn write_svg(&self, svg_output: &mut SvgOutput<'_>, _state: &()) -> fmt::Result {
        use svg_fmt::*;
        use fmt::Write;

        if self.ring.len() < 2 {
            return Ok(());
        }

        let points: Vec<_> = self.ring.iter().map(|v| [to_f32(v.x()), to_f32(v.y())]).collect();
        let (color, width) = match self.role {
            RingRole::Outer => (black(), 0.6),
            RingRole::Hole => (red(), 0.4),
            RingRole::FilteredHole => (rgb(160, 160, 160), 0.3),
        };
        writeln!(svg_output, "{}",
            polygon(&points)
                .fill(Fill::None)
                .stroke(Stroke::Color(color, svg_output.context.percent(width)))
        )
    }
}

impl<'a, V: Vertex> SvgElement for Mesh<'a, V> {
    fn write_svg(&self, svg_output: &mut SvgOutput<'_>, _state: &()) -> fmt::Result {
        use svg_fmt::*;
        use fmt::Write;

        for corners in self.triangle_positions() {
            let points = corners.map(|[x, y]| [to_f32(x), to_f32(y)]);
            writeln!(svg_output, "{}",
                polygon(&points[..])
                    .fill(Fill::Color(rgb(200, 230, 255)))
                    .stroke(Stroke::Color(blue(), svg_output.context.percent(0.1)))
            )?;
        }

        let r = svg_output.context.percent(0.4);
        let gap = svg_output.context.percent(1.0);
        for index in 0..self.vertex_count() {
            let [x, y] = match self.position(index) {
                Some(position) => position.map(to_f32),
                None => continue,
            };
            // Vertices added where rings cross are drawn in orange
            let color = if self.vertex(index).is_some() { green() } else { rgb(255, 140, 0) };
            writeln!(svg_output, "{}", circle(x, y, r).fill(Fill::Color(color)))?;
            if svg_output.context.show_labels {
                writeln!(svg_output, "{}",
                    text(x - gap, y, index.to_string())
                        .color(black())
                        .align(Align::Right)
                        .size(svg_output.context.percent(1.0))
                )?;
            }
        }
        Ok(())
    }
}

/// Writes `mesh`, along with every hole it was built from, to the next numbered file in the
/// configured output directory. Does nothing unless output is enabled.
pub(crate) fn output_triangulation<V: Vertex, H: AsRef<[V]>>(mesh: &Mesh<'_, V>, holes: &[H]) -> io::Result<()> {
    let context = match SvgContext::from_env(mesh.outer()) {
        Some(context) => context,
        None => return Ok(()),
    };

    let mut svg = SvgOutput::new(&context);
    write_triangulation(&mut svg, mesh, holes).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let n = OUTPUT_COUNTER.fetch_add(1, Ordering::Relaxed);
    svg.save(format!("{:03}.svg", n))
}

fn write_triangulation<V: Vertex, H: AsRef<[V]>>(svg: &mut SvgOutput<'_>, mesh: &Mesh<'_, V>, holes: &[H]) -> fmt::Result {
    svg.append_element(mesh, &())?;
    for (i, hole) in holes.iter().enumerate() {
        let role = if mesh.eligible_holes().contains(&i) { RingRole::Hole } else { RingRole::FilteredHole };
        svg.append_element(&RingOutline { ring: hole.as_ref(), role }, &())?;
    }
    svg.append_element(&RingOutline { ring: mesh.outer(), role: RingRole::Outer }, &())
}
