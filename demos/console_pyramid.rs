use phys2d_engine::{
    Body, Material, Shape, Space, Vector2,
    bodies::moment_for_polygon,
    shapes::ShapeKind,
};
use std::io::{stdout, Stdout, Write};
use std::time::{Duration, Instant};
use std::thread::sleep;
use crossterm::{
    ExecutableCommand, QueueableCommand,
    terminal::{Clear, ClearType, size},
    cursor::{Hide, Show, MoveTo},
    style::{Color, Print, SetForegroundColor, ResetColor},
};

const FRAME_DURATION: Duration = Duration::from_millis(33); // ~30 FPS
const SIMULATION_DURATION: f32 = 15.0; // seconds
const DT: f32 = 1.0 / 60.0;
const STEPS_PER_FRAME: usize = 2;
const LEVELS: i32 = 2;
const DOMINO_FRICTION: f32 = 0.6;

/// World window drawn to the terminal
const VIEW_MIN: Vector2 = Vector2::new(10.0, 40.0);
const VIEW_MAX: Vector2 = Vector2::new(150.0, 170.0);

const DOMINO_VERTS: [Vector2; 4] = [
    Vector2::new(-2.0, -15.0),
    Vector2::new(-2.0, 15.0),
    Vector2::new(2.0, 15.0),
    Vector2::new(2.0, -15.0),
];

fn add_domino(space: &mut Space, position: Vector2, lying: bool) -> phys2d_engine::Result<()> {
    let mut body = Body::new(1.0, moment_for_polygon(1.0, &DOMINO_VERTS, Vector2::zero()));
    body.set_position(position);
    if lying {
        body.set_angle(std::f32::consts::FRAC_PI_2);
    }
    let body = space.add_body(body)?;

    let shape = Shape::polygon(body, &DOMINO_VERTS, Vector2::zero())?
        .with_material(Material::new(0.0, DOMINO_FRICTION));
    space.add_shape(shape)?;
    Ok(())
}

/// Builds a tower of standing dominoes capped by lying ones, widening by one
/// column per level
fn build_tower(space: &mut Space) -> phys2d_engine::Result<()> {
    for i in 1..=LEVELS {
        let offset = Vector2::new(-(i as f32) * 15.0, -((LEVELS - i) as f32) * 36.0);

        for j in 0..i {
            let x = j as f32 * 30.0 + 72.0;
            add_domino(space, Vector2::new(x, 145.0) + offset, false)?;
            add_domino(space, Vector2::new(x, 128.0) + offset, true)?;

            if j != i - 1 {
                add_domino(space, Vector2::new(x + 15.0, 126.0) + offset, true)?;
            }
        }

        add_domino(space, Vector2::new(60.0, 111.0) + offset, false)?;
        add_domino(space, Vector2::new(84.0 + (i - 1) as f32 * 30.0, 111.0) + offset, false)?;
    }

    Ok(())
}

/// Maps a world point to a terminal cell, if it is in view. The world y axis
/// already points down the screen.
fn to_screen(p: Vector2, width: u16, height: u16) -> Option<(u16, u16)> {
    let u = (p.x - VIEW_MIN.x) / (VIEW_MAX.x - VIEW_MIN.x);
    let v = (p.y - VIEW_MIN.y) / (VIEW_MAX.y - VIEW_MIN.y);
    if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
        return None;
    }

    Some(((u * width as f32) as u16, (v * height as f32) as u16))
}

/// Draws the line from `a` to `b` by sampling points along it
fn draw_line(
    stdout: &mut Stdout,
    a: Vector2,
    b: Vector2,
    glyph: char,
    width: u16,
    height: u16,
) -> Result<(), std::io::Error> {
    let samples = (a.distance(&b).ceil() as usize).max(1);
    for k in 0..=samples {
        let p = a.lerp(&b, k as f32 / samples as f32);
        if let Some((x, y)) = to_screen(p, width, height) {
            stdout.queue(MoveTo(x, y))?.queue(Print(glyph))?;
        }
    }
    Ok(())
}

fn draw_shape(stdout: &mut Stdout, shape: &Shape, width: u16, height: u16) -> Result<(), std::io::Error> {
    match shape.kind() {
        ShapeKind::Polygon(polygon) => {
            let verts = polygon.world_vertices();
            for (i, a) in verts.iter().enumerate() {
                let b = verts[(i + 1) % verts.len()];
                draw_line(stdout, *a, b, '#', width, height)?;
            }
        }
        ShapeKind::Segment(segment) => {
            draw_line(stdout, segment.world_a(), segment.world_b(), '▬', width, height)?;
        }
        ShapeKind::Circle(circle) => {
            if let Some((x, y)) = to_screen(circle.world_center(), width, height) {
                stdout.queue(MoveTo(x, y))?.queue(Print('●'))?;
            }
        }
    }
    Ok(())
}

fn main() -> Result<(), std::io::Error> {
    let to_io = |err: phys2d_engine::error::PhysicsError| {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    };

    // Initialize terminal
    let mut stdout = stdout();
    stdout.execute(Hide)?;
    let (width, height) = size()?;

    let mut space = Space::new();
    space.set_gravity(Vector2::new(0.0, 300.0));
    space.resize_active_hash(30.0, 999).map_err(to_io)?;

    let floor = Shape::segment(
        space.static_body(),
        Vector2::new(-600.0, 160.0),
        Vector2::new(600.0, 160.0),
        0.0,
    )
    .with_material(Material::new(1.0, 1.0));
    space.add_static_shape(floor).map_err(to_io)?;
    build_tower(&mut space).map_err(to_io)?;

    let start_time = Instant::now();
    let mut frame_time = Instant::now();

    while start_time.elapsed().as_secs_f32() < SIMULATION_DURATION {
        for _ in 0..STEPS_PER_FRAME {
            space.step(DT);
        }

        stdout.queue(Clear(ClearType::All))?;

        stdout.queue(SetForegroundColor(Color::White))?;
        let mut result = Ok(());
        space.each_static_shape(|shape| {
            if result.is_ok() {
                result = draw_shape(&mut stdout, shape, width, height);
            }
        });
        result?;

        stdout.queue(SetForegroundColor(Color::Yellow))?;
        let mut result = Ok(());
        space.each_shape(|shape| {
            if result.is_ok() {
                result = draw_shape(&mut stdout, shape, width, height);
            }
        });
        result?;

        let contacts: usize = space.arbiters().map(|arb| arb.contacts.len()).sum();
        stdout
            .queue(SetForegroundColor(Color::Green))?
            .queue(MoveTo(0, 0))?
            .queue(Print(format!(
                "t = {:5.2}s  bodies: {}  contacts: {}",
                space.get_time(),
                space.body_count(),
                contacts
            )))?
            .queue(ResetColor)?;

        stdout.flush()?;

        // Timing control
        let elapsed = frame_time.elapsed();
        if elapsed < FRAME_DURATION {
            sleep(FRAME_DURATION - elapsed);
        }
        frame_time = Instant::now();
    }

    // Clean up
    stdout.execute(Show)?;
    stdout.execute(MoveTo(0, height.saturating_sub(1)))?;

    Ok(())
}
