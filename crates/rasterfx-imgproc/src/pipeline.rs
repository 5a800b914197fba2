use std::str::FromStr;

use rasterfx_image::PixelBuffer;
use serde::{Deserialize, Serialize};

use crate::catalog::Filter;
use crate::error::FilterError;
use crate::executor::{Executor, Progress};
use crate::morphology::{apply_morphology_with_strategy, MorphOp, StructuringElement};

/// One operation of a [`Pipeline`].
///
/// In JSON a filter step is a [`Filter`] object, and a morphology step names its operation under
/// `morphology`: `{"morphology": "close", "element": {"shape": "box", "size": 5}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// A morphological operation; runs synchronously to completion once started.
    Morphology {
        /// The operation.
        #[serde(rename = "morphology")]
        op: MorphOp,
        /// The structuring element, a 3x3 cross if omitted.
        #[serde(default)]
        element: StructuringElement,
    },
    /// A filter driven by the executor.
    Filter(Filter),
}

impl Step {
    /// Short name of the step.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Morphology { op, .. } => op.name(),
            Step::Filter(filter) => filter.name(),
        }
    }
}

impl From<Filter> for Step {
    fn from(filter: Filter) -> Self {
        Step::Filter(filter)
    }
}

impl From<MorphOp> for Step {
    fn from(op: MorphOp) -> Self {
        Step::Morphology {
            op,
            element: StructuringElement::default(),
        }
    }
}

impl FromStr for Step {
    type Err = FilterError;

    /// Parse a morphology or filter short name, with default parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(op) = s.parse::<MorphOp>() {
            return Ok(op.into());
        }
        s.parse::<Filter>()
            .map(Step::from)
            .map_err(|_| FilterError::invalid("step", format!("unknown filter or operation `{s}`")))
    }
}

/// An ordered list of steps, each consuming the previous step's result.
///
/// Progress is aggregated over the whole pipeline: every step accounts for one image height of
/// rows. Filter steps report row by row, morphology steps once when they finish.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    /// The steps, run in order.
    pub steps: Vec<Step>,
}

impl Pipeline {
    /// Create a pipeline from its steps.
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Parse every name with [`Step::from_str`].
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, FilterError> {
        let steps = names
            .iter()
            .map(|name| name.as_ref().parse())
            .collect::<Result<_, _>>()?;
        Ok(Self { steps })
    }

    /// Validate the parameters of every filter step.
    pub fn validate(&self) -> Result<(), FilterError> {
        self.steps.iter().try_for_each(|step| match step {
            Step::Filter(filter) => filter.validate(),
            Step::Morphology { .. } => Ok(()),
        })
    }

    /// Run the steps on `src`, returning the last result.
    ///
    /// Every step is validated before the first one starts. Cancellation is observed between
    /// rows of filter steps and before each step; on cancellation no intermediate result is
    /// returned. An empty pipeline returns a copy of `src`.
    pub fn run(&self, src: &PixelBuffer, executor: &Executor) -> Result<PixelBuffer, FilterError> {
        self.validate()?;

        let height = src.height();
        let total = self.steps.len() * height;
        let mut current: Option<PixelBuffer> = None;

        for (i, step) in self.steps.iter().enumerate() {
            if executor.is_cancelled() {
                log::info!("pipeline cancelled before step {i} ({})", step.name());
                return Err(FilterError::Cancelled);
            }

            let input = current.as_ref().unwrap_or(src);
            log::trace!("pipeline step {}/{}: {}", i + 1, self.steps.len(), step.name());

            let done = i * height;
            let next = match step {
                Step::Filter(filter) => {
                    let prepared = filter.prepare(input)?;
                    executor.sweep(
                        input,
                        |src, x, y| prepared.transform(src, x, y),
                        |rows| Progress {
                            completed: done + rows,
                            total,
                        },
                    )?
                }
                Step::Morphology { op, element } => {
                    let out =
                        apply_morphology_with_strategy(*op, input, element, executor.strategy())?;
                    executor.report(Progress {
                        completed: done + height,
                        total,
                    });
                    out
                }
            };
            current = Some(next);
        }

        Ok(current.unwrap_or_else(|| src.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use rasterfx_image::Rgb8;

    use super::*;
    use crate::catalog::apply;
    use crate::morphology::apply_morphology;
    use crate::parallel::ExecutionStrategy;
    use crate::executor::CancelToken;
    use crate::morphology::ElementShape;

    fn spot() -> Result<PixelBuffer, FilterError> {
        Ok(PixelBuffer::from_fn([7, 7].into(), |x, y| {
            if (x, y) == (3, 3) {
                Rgb8::new(250, 200, 150)
            } else {
                Rgb8::new(10, 20, 30)
            }
        })?)
    }

    #[test]
    fn parses_names() -> Result<(), FilterError> {
        let pipeline = Pipeline::from_names(&["gaussian", "Close", "top-hat", "invert"])?;
        let names: Vec<_> = pipeline.steps.iter().map(Step::name).collect();
        assert_eq!(names, ["gaussian", "close", "top_hat", "invert"]);
        assert!(Pipeline::from_names(&["nope"]).is_err());
        Ok(())
    }

    #[test]
    fn deserializes_mixed_steps() -> Result<(), serde_json::Error> {
        let pipeline: Pipeline = serde_json::from_str(
            r#"{"steps": [
                {"type": "median", "size": 5},
                {"morphology": "dilate"},
                {"morphology": "erode", "element": {"shape": "box", "size": 3}},
                {"morphology": "open", "element": {"rows": [[true, true, true]]}}
            ]}"#,
        )?;
        assert_eq!(pipeline.steps[0], Step::Filter(Filter::Median { size: 5 }));
        assert_eq!(pipeline.steps[1], Step::from(MorphOp::Dilate));
        match &pipeline.steps[2] {
            Step::Morphology { op, element } => {
                assert_eq!(*op, MorphOp::Erode);
                assert_eq!(element.active_count(), 9);
            }
            other => panic!("unexpected step {other:?}"),
        }
        match &pipeline.steps[3] {
            Step::Morphology { element, .. } => assert_eq!(element.radius(), (1, 0)),
            other => panic!("unexpected step {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn steps_chain_results() -> Result<(), FilterError> {
        let src = spot()?;
        let pipeline = Pipeline::new(vec![Filter::Invert.into(), Filter::Invert.into()]);
        assert_eq!(pipeline.run(&src, &Executor::new())?, src);

        let pipeline = Pipeline::new(vec![Filter::Grayscale.into(), MorphOp::Dilate.into()]);
        let expected = apply_morphology(
            MorphOp::Dilate,
            &apply(&Filter::Grayscale, &src, &Executor::new())?,
            &StructuringElement::default(),
        );
        assert_eq!(pipeline.run(&src, &Executor::new())?, expected);
        Ok(())
    }

    #[test]
    fn empty_pipeline_copies_source() -> Result<(), FilterError> {
        let src = spot()?;
        assert_eq!(Pipeline::default().run(&src, &Executor::new())?, src);
        Ok(())
    }

    #[test]
    fn progress_spans_all_steps() -> Result<(), FilterError> {
        let src = spot()?;
        let element = StructuringElement::new(ElementShape::Box { size: 3 })?;
        let pipeline = Pipeline::new(vec![
            Filter::Sharpen.into(),
            Step::Morphology {
                op: MorphOp::Erode,
                element,
            },
        ]);
        let reports = Mutex::new(Vec::new());
        {
            let executor = Executor::new().with_progress(|p| reports.lock().unwrap().push(p));
            pipeline.run(&src, &executor)?;
        }

        let reports = reports.into_inner().unwrap();
        let completed: Vec<_> = reports.iter().map(|p| p.completed).collect();
        assert_eq!(completed, [1, 2, 3, 4, 5, 6, 7, 14]);
        assert!(reports.iter().all(|p| p.total == 14));
        Ok(())
    }

    #[test]
    fn morphology_steps_follow_executor_strategy() -> Result<(), FilterError> {
        let src = spot()?;
        let pipeline = Pipeline::new(vec![MorphOp::Gradient.into(), Filter::Invert.into()]);
        let expected = pipeline.run(&src, &Executor::new())?;
        for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::Fixed(3)] {
            let executor = Executor::new().with_strategy(strategy);
            assert_eq!(pipeline.run(&src, &executor)?, expected);
        }

        let morph_only = Pipeline::new(vec![MorphOp::Dilate.into()]);
        let executor = Executor::new().with_strategy(ExecutionStrategy::Fixed(0));
        assert!(matches!(
            morph_only.run(&src, &executor),
            Err(FilterError::Parallel(_))
        ));
        Ok(())
    }

    #[test]
    fn cancellation_aborts_remaining_steps() -> Result<(), FilterError> {
        let src = spot()?;
        let before = src.clone();
        let token = CancelToken::new();
        let pipeline = Pipeline::new(vec![MorphOp::Dilate.into(), Filter::Invert.into()]);
        let executor = Executor::new()
            .with_cancel_token(token.clone())
            .with_progress(|_| token.cancel());

        assert_eq!(pipeline.run(&src, &executor), Err(FilterError::Cancelled));
        assert_eq!(src, before);
        Ok(())
    }

    #[test]
    fn invalid_step_fails_before_running() -> Result<(), FilterError> {
        let src = spot()?;
        let pipeline = Pipeline::new(vec![
            Filter::Invert.into(),
            Filter::MotionBlur { radius: 1 }.into(),
            Filter::Median { size: 2 }.into(),
        ]);
        let executor = Executor::new().with_progress(|_| panic!("nothing should run"));
        assert_eq!(
            pipeline.run(&src, &executor),
            Err(FilterError::InvalidKernelSize(2, 2))
        );
        Ok(())
    }
}
