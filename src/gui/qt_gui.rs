//! Qt-based GUI for PITERM-RS
//! Two receive panes (text and hex), a compose box, Send and Clear buttons

use crate::cli::Resolution;
use crate::core::constants::{APP_NAME, POLL_INTERVAL};
use crate::serial::SerialPort;
use crate::session::Session;
use cpp::cpp;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::{Mutex, MutexGuard, PoisonError};

cpp! {{
    #include <QtWidgets/QApplication>
    #include <QtWidgets/QWidget>
    #include <QtWidgets/QVBoxLayout>
    #include <QtWidgets/QHBoxLayout>
    #include <QtWidgets/QPlainTextEdit>
    #include <QtWidgets/QPushButton>
    #include <QtCore/QTimer>
    #include <QtCore/QString>
    #include <QtGui/QTextCursor>

    // C-compatible poll result
    struct PollData {
        const char* ascii;
        const char* hex;
    };

    // Declare Rust FFI functions
    extern "C" {
        PollData piterm_poll();
        bool piterm_send(const char* text);
        void piterm_clear();
        void piterm_shutdown();
    }

    // Append at the end and keep the view scrolled to the bottom
    void appendText(QPlainTextEdit* view, const char* text) {
        if (!text) {
            return;
        }
        view->moveCursor(QTextCursor::End);
        view->insertPlainText(QString::fromUtf8(text));
        view->ensureCursorVisible();
    }

    QPlainTextEdit* newPane(QWidget* parent) {
        QPlainTextEdit* view = new QPlainTextEdit(parent);
        view->setReadOnly(true);
        view->setLineWrapMode(QPlainTextEdit::WidgetWidth);
        return view;
    }
}}

/// C-compatible poll result (must match C++ definition)
#[repr(C)]
pub struct PollData {
    ascii: *const c_char,
    hex: *const c_char,
}

/// State reachable from the Qt callbacks
struct GuiState {
    session: Session<SerialPort>,
    // Keeps the last poll's text alive while Qt copies it
    ascii: Option<CString>,
    hex: Option<CString>,
}

static GUI_STATE: Mutex<Option<GuiState>> = Mutex::new(None);

fn lock_state() -> MutexGuard<'static, Option<GuiState>> {
    GUI_STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn to_cstring(text: String) -> Option<CString> {
    if text.is_empty() {
        return None;
    }
    CString::new(text)
        .map_err(|e| tracing::warn!("dropping display text: {}", e))
        .ok()
}

fn as_ptr(text: &Option<CString>) -> *const c_char {
    text.as_ref().map_or(std::ptr::null(), |s| s.as_ptr())
}

/// FFI: Drain new receive text for both panes.
/// Pointers stay valid until the next call; NULL means nothing new.
#[no_mangle]
pub extern "C" fn piterm_poll() -> PollData {
    let mut guard = lock_state();
    let Some(state) = guard.as_mut() else {
        return PollData {
            ascii: std::ptr::null(),
            hex: std::ptr::null(),
        };
    };

    let update = state.session.poll().unwrap_or_default();
    state.ascii = to_cstring(update.ascii);
    state.hex = to_cstring(update.hex);

    PollData {
        ascii: as_ptr(&state.ascii),
        hex: as_ptr(&state.hex),
    }
}

/// FFI: Send the compose text as one packet. Failures are logged.
///
/// # Safety
/// `text` must be NULL or a valid NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn piterm_send(text: *const c_char) -> bool {
    if text.is_null() {
        return false;
    }
    let text = CStr::from_ptr(text).to_string_lossy();

    let mut guard = lock_state();
    let Some(state) = guard.as_mut() else {
        return false;
    };

    match state.session.send(&text) {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("Send Error: {}", e);
            false
        }
    }
}

/// FFI: Clear both receive panes
#[no_mangle]
pub extern "C" fn piterm_clear() {
    if let Some(state) = lock_state().as_mut() {
        state.session.clear();
    }
}

/// FFI: Close the link; called when the window goes away
#[no_mangle]
pub extern "C" fn piterm_shutdown() {
    if let Some(state) = lock_state().as_mut() {
        if let Err(e) = state.session.shutdown() {
            tracing::error!("Shutdown failed: {}", e);
        }
    }
}

/// Run the Qt application until the window is closed
pub fn run_qt_app(session: Session<SerialPort>, resolution: Resolution) -> i32 {
    // Route Qt's own warnings through the log crate, and from there to tracing
    qmetaobject::log::init_qt_to_rust();

    *lock_state() = Some(GuiState {
        session,
        ascii: None,
        hex: None,
    });

    let title = CString::new(APP_NAME).unwrap_or_default();
    let title_ptr = title.as_ptr();
    let width = resolution.width.min(i32::MAX as u32) as i32;
    let height = resolution.height.min(i32::MAX as u32) as i32;
    let poll_ms = POLL_INTERVAL.as_millis() as i32;

    let mut argc = 0;
    let argv: *mut *mut c_char = std::ptr::null_mut();

    let code = unsafe {
        cpp!([mut argc as "int", argv as "char**", title_ptr as "const char*",
              width as "int", height as "int", poll_ms as "int"] -> i32 as "int" {
            QApplication app(argc, argv);
            app.setApplicationName(QString::fromUtf8(title_ptr));

            QWidget* window = new QWidget();
            window->setWindowTitle(QString::fromUtf8(title_ptr));
            window->resize(width, height);

            QVBoxLayout* vbox = new QVBoxLayout(window);
            QHBoxLayout* panes = new QHBoxLayout();
            QHBoxLayout* controls = new QHBoxLayout();

            // Receive panes
            QPlainTextEdit* asciiView = newPane(window);
            QPlainTextEdit* hexView = newPane(window);
            panes->addWidget(asciiView);
            panes->addWidget(hexView);

            // Compose box and buttons
            QPlainTextEdit* compose = new QPlainTextEdit(window);
            QPushButton* sendButton = new QPushButton("Send", window);
            QPushButton* clearButton = new QPushButton("Clear", window);
            controls->addWidget(compose, 1);
            controls->addWidget(sendButton);
            controls->addWidget(clearButton);

            vbox->addLayout(panes, 3);
            vbox->addLayout(controls, 1);

            QObject::connect(sendButton, &QPushButton::clicked, [=]() {
                QByteArray text = compose->toPlainText().toUtf8();
                piterm_send(text.constData());
            });

            QObject::connect(clearButton, &QPushButton::clicked, [=]() {
                asciiView->clear();
                hexView->clear();
                piterm_clear();
            });

            QTimer* timer = new QTimer(window);
            QObject::connect(timer, &QTimer::timeout, [=]() {
                PollData data = piterm_poll();
                appendText(asciiView, data.ascii);
                appendText(hexView, data.hex);
            });
            timer->start(poll_ms);

            QObject::connect(&app, &QApplication::aboutToQuit, [=]() {
                timer->stop();
                piterm_shutdown();
            });

            window->show();
            int code = app.exec();
            delete window;
            return code;
        })
    };

    // Drop the session (and its runtime) outside the Qt event loop
    lock_state().take();
    code
}
