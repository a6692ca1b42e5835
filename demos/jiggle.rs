use voxel_springs::config::DEFAULT_TIME_STEP;
use voxel_springs::*;

const VOXEL_RES: i32 = 8;

fn main() -> Result<()> {
    // Solid slab standing in for a voxelized mesh.
    let mut coords = Vec::new();
    for x in 0..VOXEL_RES {
        for y in 0..VOXEL_RES {
            for z in 0..VOXEL_RES / 2 {
                coords.push(IVec3::new(x, y, z));
            }
        }
    }

    // Stretch along X so the block jiggles once released.
    let initial = coords
        .iter()
        .map(|c| c.as_vec3() * Vec3::new(1.2, 1.0, 1.0))
        .collect();

    let config = SimulatorConfig::new(coords.clone())
        .with_initial_positions(initial)
        .with_stiffness(500.0)
        .with_damping(0.1)
        .with_gravity(Vec3::new(0.0, -9.81, 0.0))
        .with_fixed(FixedNodes::top_layer(&coords, Axis::Y));

    let mut sim = SpringSimulator::new(config)?;
    println!(
        "{} voxels, {} springs, critical dt {:?}",
        sim.num_nodes(),
        sim.num_edges(),
        sim.critical_time_step()
    );

    for frame in 0..120 {
        sim.step(DEFAULT_TIME_STEP)?;
        if frame % 30 == 0 {
            println!(
                "frame {frame:3}: kinetic {:.4}, elastic {:.4}",
                sim.kinetic_energy(),
                sim.spring_energy()
            );
        }
    }

    // A stiffer material keeps the current pose and velocities.
    let coords = sim.coords().to_vec();
    let stiffer = SimulatorConfig::new(coords.clone())
        .with_stiffness(700.0)
        .with_damping(0.1)
        .with_gravity(Vec3::new(0.0, -9.81, 0.0))
        .with_fixed(FixedNodes::top_layer(&coords, Axis::Y));
    sim.rebuild(stiffer, true)?;
    for _ in 0..60 {
        sim.step(DEFAULT_TIME_STEP)?;
    }

    if let Some(lowest) = sim
        .positions()
        .iter()
        .map(|p| p.y)
        .reduce(f32::min)
    {
        println!("lowest voxel after rebuild: y = {lowest:.3}");
    }
    sim.profiler().report();
    Ok(())
}
