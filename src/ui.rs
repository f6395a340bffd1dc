use appwrite::models::{Bucket, File};
use iocraft::prelude::*;
use tokio::sync::watch;

#[derive(Default, Props)]
pub struct ProgressBarProps {
    pub title: String,
    pub progress: Option<watch::Receiver<f32>>,
}

#[component]
pub fn ProgressBar(props: &ProgressBarProps, mut hooks: Hooks) -> impl Into<AnyElement<'static>> {
    let mut progress = hooks.use_state::<f32, _>(|| 0.0);
    let receiver = props.progress.clone();

    hooks.use_future(async move {
        if let Some(mut rx) = receiver {
            while rx.changed().await.is_ok() {
                let value = *rx.borrow();
                progress.set(value);
            }
        }
    });

    element! {
        View(flex_direction: FlexDirection::Column) {
            Text(weight: Weight::Bold, content: props.title.clone())
            View(flex_direction: FlexDirection::Row) {
                View(border_style: BorderStyle::Round, border_color: Color::Blue, width: 52) {
                    View(width: Percent(progress.get()), height: 1, background_color: Color::Green)
                }
                View(padding: 1) {
                    Text(content: format!("{:>3.0}%", progress.get()))
                }
            }
        }
    }
}

#[derive(Default, Props)]
pub struct MessageProps {
    pub message: String,
}

#[component]
pub fn ErrorMessage(props: &MessageProps) -> impl Into<AnyElement<'static>> {
    element! {
        Text(color: Color::Red, content: format!("✗ {}", props.message))
    }
}

#[component]
pub fn SuccessMessage(props: &MessageProps) -> impl Into<AnyElement<'static>> {
    element! {
        Text(color: Color::Green, weight: Weight::Bold, content: format!("✓ {}", props.message))
    }
}

#[component]
pub fn ConfigHeader() -> impl Into<AnyElement<'static>> {
    element! {
        View(flex_direction: FlexDirection::Column, margin_bottom: 1) {
            View(background_color: Color::Magenta) {
                Text(color: Color::White, weight: Weight::Bold, content: " aw configuration ")
            }
            Text(content: "Press enter to accept the value in brackets.")
        }
    }
}

#[derive(Default, Props)]
pub struct InputPromptProps {
    pub prompt: String,
    pub default: Option<String>,
    pub description: Option<String>,
}

#[component]
pub fn InputPrompt(props: &InputPromptProps) -> impl Into<AnyElement<'static>> {
    let label = match &props.default {
        Some(default) => format!("{} [{}]", props.prompt, default),
        None => props.prompt.clone(),
    };

    element! {
        View(flex_direction: FlexDirection::Column) {
            Text(weight: Weight::Bold, content: label)
            #(props.description.as_ref().map(|description| element! {
                Text(color: Color::DarkGrey, content: description.clone())
            }))
        }
    }
}

#[derive(Default, Props)]
pub struct BucketListProps {
    pub buckets: Vec<Bucket>,
}

#[component]
pub fn BucketList(props: &BucketListProps) -> impl Into<AnyElement<'static>> {
    element! {
        View(flex_direction: FlexDirection::Column) {
            #(props.buckets.iter().map(|bucket| {
                let color = if bucket.enabled { Color::Reset } else { Color::DarkGrey };
                element! {
                    View(flex_direction: FlexDirection::Row) {
                        View(width: 24) {
                            Text(weight: Weight::Bold, color: color, content: bucket.id.clone())
                        }
                        Text(color: color, content: bucket.name.clone())
                    }
                }
            }))
        }
    }
}

#[derive(Default, Props)]
pub struct FileListProps {
    pub files: Vec<File>,
}

#[component]
pub fn FileList(props: &FileListProps) -> impl Into<AnyElement<'static>> {
    element! {
        View(flex_direction: FlexDirection::Column) {
            #(props.files.iter().map(|file| {
                let status = if file.is_complete() {
                    format!("{} bytes", file.size_original)
                } else {
                    format!("partial {}/{} chunks", file.chunks_uploaded, file.chunks_total)
                };
                element! {
                    View(flex_direction: FlexDirection::Row) {
                        View(width: 24) {
                            Text(weight: Weight::Bold, content: file.id.clone())
                        }
                        View(width: 40) {
                            Text(content: file.name.clone())
                        }
                        Text(color: Color::DarkGrey, content: status)
                    }
                }
            }))
        }
    }
}
