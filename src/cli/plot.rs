use chrono::{DateTime, FixedOffset};
use svg::{
    node::{
        self,
        element::{path::Data, Circle, Group, Line, Path, Rectangle, Text},
    },
    Document,
};

use crate::lib::{budget::BudgetPoint, date::Date, usage::UsagePoint};

/// Position along the time axis
pub trait Scalar {
    /// seconds since the epoch
    fn to_scalar(&self) -> f64;
    /// calendar day that contains the position
    fn to_date(&self) -> Date;
}

impl Scalar for Date {
    fn to_scalar(&self) -> f64 {
        self.timestamp() as f64
    }

    fn to_date(&self) -> Date {
        *self
    }
}

impl Scalar for DateTime<FixedOffset> {
    fn to_scalar(&self) -> f64 {
        self.timestamp() as f64
    }

    fn to_date(&self) -> Date {
        Date::of(self)
    }
}

#[derive(Debug)]
struct Series {
    label: &'static str,
    color: &'static str,
    points: Vec<(f64, f64)>,
    days: Option<(Date, Date)>,
}

impl Series {
    fn new<X, I>(label: &'static str, color: &'static str, data: I) -> Self
    where
        X: Scalar,
        I: Iterator<Item = (X, f64)>,
    {
        let mut points = Vec::new();
        let mut days: Option<(Date, Date)> = None;
        for (x, y) in data {
            let d = x.to_date();
            days = Some(match days {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
            points.push((x.to_scalar(), y));
        }
        Self { label, color, points, days }
    }
}

/// Burn-up chart of hours used against hours purchased
#[derive(Debug)]
pub struct Plotter {
    title: String,
    series: Vec<Series>,
}

impl Plotter {
    pub fn from(usage: &[UsagePoint], budget: &[BudgetPoint]) -> Self {
        Self {
            title: String::new(),
            series: vec![
                Series::new("Hours used", COLORS[0], usage.iter().map(|p| (p.at, p.hours))),
                Series::new("Hours purchased", COLORS[1], budget.iter().map(|p| (p.date, p.hours))),
            ],
        }
    }

    pub fn with_title<S>(mut self, title: S) -> Self
    where S: ToString {
        self.title = title.to_string();
        self
    }

    pub fn save(&self, file: &std::path::Path) -> std::io::Result<()> {
        svg::save(file, &self.render())
    }

    pub fn render(&self) -> Document {
        let frame = Frame::fit(&self.series);
        let mut document = Document::new()
            .set("viewBox", (0.0, 0.0, WIDTH, HEIGHT))
            .set("font-family", "sans-serif")
            .add(
                Rectangle::new()
                    .set("width", WIDTH)
                    .set("height", HEIGHT)
                    .set("fill", "white"),
            )
            .add(frame.x_grid())
            .add(frame.y_grid())
            .add(frame.axes())
            .add(
                label(WIDTH / 2.0, 30.0, &self.title)
                    .set("font-size", 20)
                    .set("text-anchor", "middle"),
            );
        for series in self.series.iter().filter(|s| !s.points.is_empty()) {
            document = document.add(frame.draw(series));
        }
        document.add(self.legend())
    }

    fn legend(&self) -> Group {
        self.series
            .iter()
            .enumerate()
            .fold(Group::new(), |group, (i, series)| {
                let y = TOP + 20.0 + 20.0 * i as f64;
                group
                    .add(
                        Line::new()
                            .set("x1", LEFT + 15.0)
                            .set("x2", LEFT + 40.0)
                            .set("y1", y)
                            .set("y2", y)
                            .set("stroke", series.color)
                            .set("stroke-width", STROKE_WIDTH),
                    )
                    .add(label(LEFT + 48.0, y + 5.0, series.label).set("font-size", 14))
            })
    }
}

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 650.0;
const LEFT: f64 = 80.0;
const RIGHT: f64 = 40.0;
const TOP: f64 = 60.0;
const BOTTOM: f64 = 120.0;
const STROKE_WIDTH: f64 = 2.0;
const MARKER_RADIUS: f64 = 3.0;
const Y_TICKS: f64 = 8.0;
const DAY: f64 = 86_400.0;

/// Data range mapped onto the drawing area
#[derive(Debug)]
struct Frame {
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
    ystep: f64,
    days: Option<(Date, Date)>,
}

impl Frame {
    fn fit(series: &[Series]) -> Self {
        let mut xmin = f64::MAX;
        let mut xmax = f64::MIN;
        let mut ymin = 0.0_f64;
        let mut ymax = f64::MIN;
        let mut days: Option<(Date, Date)> = None;
        for s in series {
            for (x, y) in &s.points {
                xmin = xmin.min(*x);
                xmax = xmax.max(*x);
                ymin = ymin.min(*y);
                ymax = ymax.max(*y);
            }
            if let Some((lo, hi)) = s.days {
                days = Some(match days {
                    None => (lo, hi),
                    Some((a, b)) => (a.min(lo), b.max(hi)),
                });
            }
        }
        if xmin > xmax {
            // nothing to draw
            xmin = 0.0;
            xmax = DAY;
        } else if xmin == xmax {
            xmin -= DAY;
            xmax += DAY;
        }
        if ymax <= ymin {
            ymax = ymin + 1.0;
        }
        let ystep = nice_step((ymax - ymin) / Y_TICKS);
        Self {
            xmin,
            xmax,
            ymin: (ymin / ystep).floor() * ystep,
            ymax: (ymax / ystep).ceil() * ystep,
            ystep,
            days,
        }
    }

    fn x(&self, x: f64) -> f64 {
        LEFT + (x - self.xmin) / (self.xmax - self.xmin) * (WIDTH - LEFT - RIGHT)
    }

    fn y(&self, y: f64) -> f64 {
        HEIGHT - BOTTOM - (y - self.ymin) / (self.ymax - self.ymin) * (HEIGHT - TOP - BOTTOM)
    }

    /// One vertical line and one `DD/MM/YYYY` label per month
    fn x_grid(&self) -> Group {
        let ticks = match self.days {
            Some((first, last)) => first.month_starts(last).collect::<Vec<_>>(),
            None => Vec::new(),
        };
        ticks
            .into_iter()
            .map(|d| (self.x(d.to_scalar()), d))
            .filter(|(x, _)| (LEFT..=WIDTH - RIGHT).contains(x))
            .fold(Group::new(), |group, (x, d)| {
                let y = HEIGHT - BOTTOM + 15.0;
                group
                    .add(grid_line(x, x, TOP, HEIGHT - BOTTOM))
                    .add(
                        label(x, y, &d.dmy())
                            .set("font-size", 12)
                            .set("text-anchor", "end")
                            .set("transform", format!("rotate(-30 {} {})", x, y)),
                    )
            })
            .add(
                label(WIDTH / 2.0, HEIGHT - 15.0, "Date")
                    .set("font-size", 14)
                    .set("text-anchor", "middle"),
            )
    }

    fn y_grid(&self) -> Group {
        let count = ((self.ymax - self.ymin) / self.ystep).round() as usize;
        (0..=count)
            .map(|i| self.ymin + i as f64 * self.ystep)
            .fold(Group::new(), |group, v| {
                let y = self.y(v);
                group.add(grid_line(LEFT, WIDTH - RIGHT, y, y)).add(
                    label(LEFT - 8.0, y + 4.0, &format_hours(v))
                        .set("font-size", 12)
                        .set("text-anchor", "end"),
                )
            })
            .add(
                label(20.0, (TOP + HEIGHT - BOTTOM) / 2.0, "Hours")
                    .set("font-size", 14)
                    .set("text-anchor", "middle")
                    .set("transform", format!("rotate(-90 20 {})", (TOP + HEIGHT - BOTTOM) / 2.0)),
            )
    }

    fn axes(&self) -> Group {
        let axis = |x1: f64, x2: f64, y1: f64, y2: f64| {
            Line::new()
                .set("x1", x1)
                .set("x2", x2)
                .set("y1", y1)
                .set("y2", y2)
                .set("stroke", "black")
                .set("stroke-width", STROKE_WIDTH)
        };
        Group::new()
            .add(axis(LEFT, LEFT, TOP, HEIGHT - BOTTOM))
            .add(axis(LEFT, WIDTH - RIGHT, HEIGHT - BOTTOM, HEIGHT - BOTTOM))
    }

    fn draw(&self, series: &Series) -> Group {
        let mut points = series.points.iter().map(|(x, y)| (self.x(*x), self.y(*y)));
        let mut group = Group::new();
        if let Some(first) = points.next() {
            let data = points.fold(Data::new().move_to(first), |data, pt| data.line_to(pt));
            group = group.add(
                Path::new()
                    .set("fill", "none")
                    .set("stroke", series.color)
                    .set("stroke-width", STROKE_WIDTH)
                    .set("d", data),
            );
        }
        series
            .points
            .iter()
            .fold(group, |group, (x, y)| {
                group.add(
                    Circle::new()
                        .set("cx", self.x(*x))
                        .set("cy", self.y(*y))
                        .set("r", MARKER_RADIUS)
                        .set("fill", series.color),
                )
            })
    }
}

fn grid_line(x1: f64, x2: f64, y1: f64, y2: f64) -> Line {
    Line::new()
        .set("x1", x1)
        .set("x2", x2)
        .set("y1", y1)
        .set("y2", y2)
        .set("stroke", "#dddddd")
        .set("stroke-width", 1.0)
}

fn label(x: f64, y: f64, text: &str) -> Text {
    Text::new()
        .set("x", x)
        .set("y", y)
        .add(node::Text::new(escape(text)))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Tick spacing of 1, 2 or 5 times a power of ten, no smaller than `raw`
fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let norm = raw / magnitude;
    let step = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    step * magnitude
}

fn format_hours(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

const COLORS: &[&str] = &[
    "#1f77b4",
    "#ff7f0e",
];

#[cfg(test)]
mod test {
    use super::*;
    use crate::lib::{
        budget::{project_budget, MonthBudget},
        date::Month,
        usage::{cumulative_usage, TimeEntry},
    };

    fn chart() -> String {
        let start = Date::from(2023, Month::Dec, 1).unwrap();
        let entries = [
            TimeEntry { start: DateTime::parse_from_rfc3339("2023-12-05T09:00:00Z").unwrap(), duration: 7200.0 },
            TimeEntry { start: DateTime::parse_from_rfc3339("2024-01-10T09:00:00Z").unwrap(), duration: 3600.0 },
        ];
        let usage = cumulative_usage(&entries, start.midnight());
        let budget = project_budget(
            &[
                MonthBudget { month: start, days: 7.0 },
                MonthBudget { month: Date::from(2024, Month::Jan, 1).unwrap(), days: 7.0 },
            ],
            8.0,
        );
        Plotter::from(&usage, &budget)
            .with_title("DLP Hours Used (as of 2024/01/15)")
            .render()
            .to_string()
    }

    #[test]
    fn labels() {
        let svg = chart();
        assert!(svg.contains("DLP Hours Used (as of 2024/01/15)"));
        assert!(svg.contains("Date"));
        // y axis label
        assert!(svg.contains("rotate(-90"));
        assert!(svg.contains("Hours used"));
        assert!(svg.contains("Hours purchased"));
    }

    #[test]
    fn one_tick_per_month() {
        let svg = chart();
        assert!(svg.contains("01/12/2023"));
        assert!(svg.contains("01/01/2024"));
        assert!(!svg.contains("01/02/2024"));
    }

    #[test]
    fn one_marker_per_point() {
        // 3 usage points, 3 budget points
        assert_eq!(chart().matches("<circle").count(), 6);
    }

    #[test]
    fn single_point_is_drawable() {
        let start = Date::from(2023, Month::Dec, 1).unwrap();
        let usage = cumulative_usage(&[], start.midnight());
        let svg = Plotter::from(&usage, &[]).render().to_string();
        assert_eq!(svg.matches("<circle").count(), 1);
        assert!(!svg.contains("NaN"));
        assert!(svg.contains("01/12/2023"));
    }

    #[test]
    fn title_is_escaped() {
        let svg = Plotter::from(&[], &[]).with_title("R&D <ops>").render().to_string();
        assert!(svg.contains("R&amp;D &lt;ops&gt;"));
        assert!(svg.contains("Date"));
    }

    #[test]
    fn tick_steps() {
        assert!((nice_step(0.3) - 0.5).abs() < 1e-12);
        assert_eq!(nice_step(1.0), 1.0);
        assert_eq!(nice_step(14.0), 20.0);
        assert_eq!(nice_step(67.0), 100.0);
        assert_eq!(format_hours(40.0), "40");
        assert_eq!(format_hours(0.5), "0.5");
    }
}
