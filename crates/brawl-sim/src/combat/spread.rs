//! Projectile fan geometry.

use glam::DVec2;

/// Headings for one volley.
///
/// With more than one projectile and a positive spread (degrees), the
/// volley fans evenly from `base - spread/2` to `base + spread/2`.
/// Otherwise a single projectile flies along `base_angle`.
pub fn fan(base_angle: f64, count: u32, spread_deg: f64) -> Vec<DVec2> {
    if count <= 1 || spread_deg <= 0.0 {
        return vec![DVec2::from_angle(base_angle)];
    }
    let spread = spread_deg.to_radians();
    let start = base_angle - spread / 2.0;
    let step = spread / f64::from(count - 1);
    (0..count)
        .map(|i| DVec2::from_angle(start + step * f64::from(i)))
        .collect()
}
