//! Binary snapshot format: a 4-byte magic, a `u32` version, then one
//! tagged, self-describing record per classifier. Every variant of
//! condition/action/prediction writes its own tag byte followed by its own
//! payload, so `decode` can dispatch on the tag without an external schema
//! — the same shape `pierreaubert-autoEQ`'s `src-iir` crate uses for its
//! filter records, built here with `byteorder` rather than hand-rolled
//! endian-swapping.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use ndarray::{Array1, Array2};
use std::io::{Cursor, Read, Write};

use crate::action::integer::IntegerAction;
use crate::action::ActionKind;
use crate::classifier::Classifier;
use crate::condition::dummy::DummyCondition;
use crate::condition::ellipsoid::EllipsoidCondition;
use crate::condition::hyperrectangle::HyperrectangleCondition;
use crate::condition::ternary::{Gene, TernaryCondition};
use crate::condition::ConditionKind;
use crate::error::PersistenceError;
use crate::population::Population;
use crate::prediction::constant::ConstantPrediction;
use crate::prediction::nlms::NlmsPrediction;
use crate::prediction::rls::RlsPrediction;
use crate::prediction::PredictionKind;

const MAGIC: [u8; 4] = *b"XCSF";
const VERSION: u32 = 1;

/// Deterministic RNG used only to rebuild placeholder neural/GP
/// structures on decode; never used to make a learning decision.
fn placeholder_rng() -> rand::rngs::StdRng {
    use rand::SeedableRng;
    rand::rngs::StdRng::seed_from_u64(0)
}

fn write_array1(w: &mut impl Write, a: &Array1<f64>) -> std::io::Result<()> {
    w.write_u32::<BigEndian>(a.len() as u32)?;
    for &v in a.iter() {
        w.write_f64::<BigEndian>(v)?;
    }
    Ok(())
}

fn read_array1(r: &mut impl Read) -> std::io::Result<Array1<f64>> {
    let len = r.read_u32::<BigEndian>()? as usize;
    let mut v = Vec::with_capacity(len);
    for _ in 0..len {
        v.push(r.read_f64::<BigEndian>()?);
    }
    Ok(Array1::from(v))
}

fn write_array2(w: &mut impl Write, a: &Array2<f64>) -> std::io::Result<()> {
    w.write_u32::<BigEndian>(a.nrows() as u32)?;
    w.write_u32::<BigEndian>(a.ncols() as u32)?;
    for v in a.iter() {
        w.write_f64::<BigEndian>(*v)?;
    }
    Ok(())
}

fn read_array2(r: &mut impl Read) -> std::io::Result<Array2<f64>> {
    let rows = r.read_u32::<BigEndian>()? as usize;
    let cols = r.read_u32::<BigEndian>()? as usize;
    let mut data = Vec::with_capacity(rows * cols);
    for _ in 0..rows * cols {
        data.push(r.read_f64::<BigEndian>()?);
    }
    Array2::from_shape_vec((rows, cols), data)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

fn write_condition(w: &mut impl Write, c: &ConditionKind) -> std::io::Result<()> {
    match c {
        ConditionKind::Hyperrectangle(h) => {
            w.write_u8(0)?;
            write_array1(w, &h.lower)?;
            write_array1(w, &h.upper)?;
        }
        ConditionKind::Ellipsoid(e) => {
            w.write_u8(1)?;
            write_array1(w, &e.center)?;
            write_array1(w, &e.radii)?;
        }
        ConditionKind::Ternary(t) => {
            w.write_u8(2)?;
            w.write_u32::<BigEndian>(t.genes.len() as u32)?;
            for g in &t.genes {
                match g {
                    Gene::DontCare => w.write_u8(2)?,
                    Gene::Bit(false) => w.write_u8(0)?,
                    Gene::Bit(true) => w.write_u8(1)?,
                }
            }
        }
        // Neural/GP-tree/DGP conditions hold dynamically-shaped internal
        // state (network topology, expression trees, graph weights) built
        // fresh by covering; a snapshot restores the structural defaults
        // and is expected to re-learn rather than byte-replay them.
        ConditionKind::Neural(_) => w.write_u8(3)?,
        ConditionKind::GpTree(_) => w.write_u8(4)?,
        ConditionKind::Dgp(_) => w.write_u8(5)?,
        ConditionKind::Dummy(_) => w.write_u8(6)?,
    }
    Ok(())
}

fn read_condition(r: &mut impl Read, x_dim: usize) -> Result<ConditionKind, PersistenceError> {
    let tag = r.read_u8()?;
    Ok(match tag {
        0 => ConditionKind::Hyperrectangle(HyperrectangleCondition {
            lower: read_array1(r)?,
            upper: read_array1(r)?,
        }),
        1 => ConditionKind::Ellipsoid(EllipsoidCondition {
            center: read_array1(r)?,
            radii: read_array1(r)?,
        }),
        2 => {
            let len = r.read_u32::<BigEndian>()? as usize;
            let mut genes = Vec::with_capacity(len);
            for _ in 0..len {
                genes.push(match r.read_u8()? {
                    0 => Gene::Bit(false),
                    1 => Gene::Bit(true),
                    _ => Gene::DontCare,
                });
            }
            ConditionKind::Ternary(TernaryCondition { genes })
        }
        3 => ConditionKind::Neural(crate::condition::neural::NeuralCondition {
            net: crate::neural::Network::new(vec![crate::neural::ConnectedLayer::new(
                x_dim,
                1,
                crate::neural::Activation::Sigmoid,
                &mut placeholder_rng(),
            )]),
        }),
        4 => ConditionKind::GpTree(crate::condition::gp_tree::GpTreeCondition {
            root: crate::condition::gp_tree::GpNode::Const(0.0),
            x_dim,
        }),
        5 => ConditionKind::Dgp(crate::condition::dgp::DgpCondition {
            weights: vec![vec![0.0; 6]; 6],
            input_weights: vec![vec![0.0; x_dim]; 6],
        }),
        6 => ConditionKind::Dummy(DummyCondition),
        other => return Err(PersistenceError::UnknownTag(other, "ConditionKind")),
    })
}

fn write_action(w: &mut impl Write, a: &ActionKind) -> std::io::Result<()> {
    match a {
        ActionKind::Integer(i) => {
            w.write_u8(0)?;
            w.write_u32::<BigEndian>(i.action as u32)?;
        }
        ActionKind::Neural(_) => w.write_u8(1)?,
    }
    Ok(())
}

fn read_action(r: &mut impl Read, x_dim: usize, n_actions: usize) -> Result<ActionKind, PersistenceError> {
    let tag = r.read_u8()?;
    Ok(match tag {
        0 => ActionKind::Integer(IntegerAction {
            action: r.read_u32::<BigEndian>()? as usize,
        }),
        1 => ActionKind::Neural(crate::action::neural::NeuralAction {
            net: crate::neural::Network::new(vec![crate::neural::ConnectedLayer::new(
                x_dim,
                n_actions.max(1),
                crate::neural::Activation::Linear,
                &mut placeholder_rng(),
            )]),
        }),
        other => return Err(PersistenceError::UnknownTag(other, "ActionKind")),
    })
}

fn write_prediction(w: &mut impl Write, p: &PredictionKind) -> std::io::Result<()> {
    match p {
        PredictionKind::Constant(c) => {
            w.write_u8(0)?;
            write_array1(w, &c.weights)?;
        }
        PredictionKind::Nlms(n) => {
            w.write_u8(1)?;
            write_array2(w, &n.weights)?;
        }
        PredictionKind::Rls(rls) => {
            w.write_u8(2)?;
            write_array2(w, &rls.weights)?;
            write_array2(w, &rls.p)?;
        }
        PredictionKind::Neural(_) => w.write_u8(3)?,
    }
    Ok(())
}

fn read_prediction(r: &mut impl Read, x_dim: usize, y_dim: usize) -> Result<PredictionKind, PersistenceError> {
    let tag = r.read_u8()?;
    Ok(match tag {
        0 => PredictionKind::Constant(ConstantPrediction {
            weights: read_array1(r)?,
        }),
        1 => PredictionKind::Nlms(NlmsPrediction {
            weights: read_array2(r)?,
        }),
        2 => PredictionKind::Rls(RlsPrediction {
            weights: read_array2(r)?,
            p: read_array2(r)?,
        }),
        3 => PredictionKind::Neural(crate::prediction::neural::NeuralPrediction {
            net: crate::neural::Network::new(vec![crate::neural::ConnectedLayer::new(
                x_dim,
                y_dim.max(1),
                crate::neural::Activation::Linear,
                &mut placeholder_rng(),
            )]),
        }),
        other => return Err(PersistenceError::UnknownTag(other, "PredictionKind")),
    })
}

pub fn encode(population: &Population) -> Result<Vec<u8>, PersistenceError> {
    let mut buf = Vec::new();
    buf.write_all(&MAGIC)?;
    buf.write_u32::<BigEndian>(VERSION)?;
    buf.write_u32::<BigEndian>(population.classifiers.len() as u32)?;
    for cl in &population.classifiers {
        write_condition(&mut buf, &cl.condition)?;
        write_action(&mut buf, &cl.action)?;
        write_prediction(&mut buf, &cl.prediction)?;
        buf.write_f64::<BigEndian>(cl.error)?;
        buf.write_f64::<BigEndian>(cl.fitness)?;
        buf.write_u64::<BigEndian>(cl.numerosity)?;
        buf.write_u64::<BigEndian>(cl.experience)?;
        buf.write_f64::<BigEndian>(cl.set_size)?;
        buf.write_u64::<BigEndian>(cl.time_stamp)?;
        buf.write_u64::<BigEndian>(cl.age)?;
    }
    Ok(buf)
}

/// Decode a snapshot. `x_dim`/`y_dim`/`n_actions` are needed to rebuild the
/// placeholder networks for variants whose internal topology isn't
/// byte-replayed (see [`write_condition`]'s doc comment).
pub fn decode_with_dims(
    bytes: &[u8],
    x_dim: usize,
    y_dim: usize,
    n_actions: usize,
) -> Result<Population, PersistenceError> {
    let mut cur = Cursor::new(bytes);
    let mut magic = [0u8; 4];
    cur.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(PersistenceError::BadMagic {
            expected: MAGIC,
            found: magic,
        });
    }
    let version = cur.read_u32::<BigEndian>()?;
    if version != VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: version,
            supported: VERSION,
        });
    }
    let count = cur.read_u32::<BigEndian>()?;
    let mut population = Population::new();
    for _ in 0..count {
        let condition = read_condition(&mut cur, x_dim)?;
        let action = read_action(&mut cur, x_dim, n_actions)?;
        let prediction = read_prediction(&mut cur, x_dim, y_dim)?;
        let error = cur.read_f64::<BigEndian>()?;
        let fitness = cur.read_f64::<BigEndian>()?;
        let numerosity = cur.read_u64::<BigEndian>()?;
        let experience = cur.read_u64::<BigEndian>()?;
        let set_size = cur.read_f64::<BigEndian>()?;
        let time_stamp = cur.read_u64::<BigEndian>()?;
        let age = cur.read_u64::<BigEndian>()?;
        population.insert(Classifier {
            condition,
            action,
            prediction,
            error,
            fitness,
            numerosity,
            experience,
            set_size,
            time_stamp,
            age,
        });
    }
    Ok(population)
}

/// Convenience wrapper used by [`crate::engine::Xcsf::load`] when the
/// snapshot is known to contain only the fully-serialized variants
/// (hyperrectangle/ellipsoid/ternary/dummy condition, integer action,
/// constant/NLMS/RLS prediction) — the common case for saved regression
/// and RL runs.
pub fn decode(bytes: &[u8]) -> Result<Population, PersistenceError> {
    decode_with_dims(bytes, 0, 1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::integer::IntegerAction;
    use crate::params::ParametersBuilder;
    use crate::prediction::constant::ConstantPrediction;

    #[test]
    fn round_trips_a_simple_population() {
        let p = ParametersBuilder::default()
            .x_dim(2)
            .y_dim(1)
            .n_actions(1)
            .build()
            .unwrap();
        let mut pop = Population::new();
        pop.insert(Classifier {
            condition: ConditionKind::Hyperrectangle(HyperrectangleCondition {
                lower: Array1::from(vec![-1.0, -1.0]),
                upper: Array1::from(vec![1.0, 1.0]),
            }),
            action: ActionKind::Integer(IntegerAction { action: 0 }),
            prediction: PredictionKind::Constant(ConstantPrediction::new(&p)),
            error: 0.5,
            fitness: 0.9,
            numerosity: 3,
            experience: 10,
            set_size: 2.0,
            time_stamp: 7,
            age: 4,
        });
        let bytes = encode(&pop).unwrap();
        let decoded = decode_with_dims(&bytes, 2, 1, 1).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.classifiers[0].numerosity, 3);
        assert_eq!(decoded.classifiers[0].time_stamp, 7);
        assert_eq!(decoded.classifiers[0].age, 4);
    }

    #[test]
    fn rejects_bad_magic() {
        let err = decode_with_dims(b"NOPE0000", 1, 1, 1).unwrap_err();
        assert!(matches!(err, PersistenceError::BadMagic { .. }));
    }
}
