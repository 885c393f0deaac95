use crate::array::NdArray;
use crate::errors::FxResult;
use crate::types::Element;
use ndarray::Zip;

/// Unary elementwise operations: `Z[i] = f(X[i], extra)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOp {
    Abs,
    Neg,
    Sqrt,
    Exp,
    Log,
    Sin,
    Cos,
    Tanh,
    Sigmoid,
    Sign,
    Ceil,
    Floor,
    Round,
    OneMinus,
    Identity,
    SoftPlus,
    Elu,
    HardTanh,
    LeakyRelu,
    Pow,
}

impl TransformOp {
    pub fn from_num(num: i32) -> Option<Self> {
        Some(match num {
            0 => Self::Abs,
            1 => Self::Neg,
            2 => Self::Sqrt,
            3 => Self::Exp,
            4 => Self::Log,
            5 => Self::Sin,
            6 => Self::Cos,
            7 => Self::Tanh,
            8 => Self::Sigmoid,
            9 => Self::Sign,
            10 => Self::Ceil,
            11 => Self::Floor,
            12 => Self::Round,
            13 => Self::OneMinus,
            14 => Self::Identity,
            15 => Self::SoftPlus,
            16 => Self::Elu,
            17 => Self::HardTanh,
            18 => Self::LeakyRelu,
            19 => Self::Pow,
            _ => return None,
        })
    }

    pub fn as_num(self) -> i32 {
        match self {
            Self::Abs => 0,
            Self::Neg => 1,
            Self::Sqrt => 2,
            Self::Exp => 3,
            Self::Log => 4,
            Self::Sin => 5,
            Self::Cos => 6,
            Self::Tanh => 7,
            Self::Sigmoid => 8,
            Self::Sign => 9,
            Self::Ceil => 10,
            Self::Floor => 11,
            Self::Round => 12,
            Self::OneMinus => 13,
            Self::Identity => 14,
            Self::SoftPlus => 15,
            Self::Elu => 16,
            Self::HardTanh => 17,
            Self::LeakyRelu => 18,
            Self::Pow => 19,
        }
    }

    pub const ALL: [TransformOp; 20] = [
        Self::Abs,
        Self::Neg,
        Self::Sqrt,
        Self::Exp,
        Self::Log,
        Self::Sin,
        Self::Cos,
        Self::Tanh,
        Self::Sigmoid,
        Self::Sign,
        Self::Ceil,
        Self::Floor,
        Self::Round,
        Self::OneMinus,
        Self::Identity,
        Self::SoftPlus,
        Self::Elu,
        Self::HardTanh,
        Self::LeakyRelu,
        Self::Pow,
    ];

    pub fn apply<T: Element>(self, x: T, extra: &[T]) -> T {
        let one = T::one();
        match self {
            Self::Abs => x.abs(),
            Self::Neg => -x,
            Self::Sqrt => x.sqrt(),
            Self::Exp => x.exp(),
            Self::Log => x.ln(),
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tanh => x.tanh(),
            Self::Sigmoid => one / (one + (-x).exp()),
            Self::Sign => {
                if x == T::zero() {
                    T::zero()
                } else {
                    x.signum()
                }
            }
            Self::Ceil => x.ceil(),
            Self::Floor => x.floor(),
            Self::Round => x.round(),
            Self::OneMinus => one - x,
            Self::Identity => x,
            Self::SoftPlus => (one + x.exp()).ln(),
            Self::Elu => {
                let alpha = extra.first().copied().unwrap_or(one);
                if x > T::zero() {
                    x
                } else {
                    alpha * (x.exp() - one)
                }
            }
            Self::HardTanh => x.max(-one).min(one),
            Self::LeakyRelu => {
                let alpha = extra
                    .first()
                    .copied()
                    .unwrap_or_else(|| T::from_f64(0.01).unwrap_or_else(T::zero));
                if x >= T::zero() {
                    x
                } else {
                    alpha * x
                }
            }
            Self::Pow => {
                let exponent = extra.first().copied().unwrap_or(one);
                x.powf(exponent)
            }
        }
    }
}

/// Runs the transform over a fresh copy of `x`. The dense stride of a dense
/// input carries over unchanged.
pub fn exec<T: Element>(op: TransformOp, x: &NdArray<T>, extra: &[T]) -> FxResult<NdArray<T>> {
    let mut z = x.dup(x.order());
    {
        let mut zv = z.view_mut()?;
        #[cfg(feature = "rayon")]
        Zip::from(&mut zv).par_for_each(|v| *v = op.apply(*v, extra));
        #[cfg(not(feature = "rayon"))]
        Zip::from(&mut zv).for_each(|v| *v = op.apply(*v, extra));
    }
    Ok(z)
}
